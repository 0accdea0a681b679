pub mod counter_routes;
pub mod system_routes;
