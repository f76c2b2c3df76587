mod router_scheduling;
mod scenario;
mod support;
