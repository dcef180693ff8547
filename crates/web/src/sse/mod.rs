pub mod broadcaster;
pub mod events;

pub use broadcaster::Broadcaster;
pub use events::SessionEvent;
