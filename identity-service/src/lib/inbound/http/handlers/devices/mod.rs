pub mod list_devices;
pub mod terminate_device;
pub mod terminate_other_devices;

pub use list_devices::list_devices;
pub use terminate_device::terminate_device;
pub use terminate_other_devices::terminate_other_devices;
