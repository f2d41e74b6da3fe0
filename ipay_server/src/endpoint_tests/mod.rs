mod auth;
mod payments;
mod transactions;
