mod bus_adapter;

pub use bus_adapter::GatewayBusAdapter;
