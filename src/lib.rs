pub mod error;
pub mod net;
pub mod router;
pub mod routing;
pub mod sim;
pub mod store;
pub mod topo;

#[cfg(test)]
mod test;
