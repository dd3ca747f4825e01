//! Rooms for the felt table: seating, timers for automated seats, per-viewer
//! snapshots over an event bus, and layered configuration.

pub mod errors;
pub mod events;
pub mod logging;
pub mod room;
pub mod settings;

pub use errors::{ErrorResponse, ErrorSeverity, RoomError};
pub use events::{EventBus, EventSubscription, RoomEvent, RoomId};
pub use logging::{init_json_logging, init_logging, init_test_logging, CapturedEvent, LogCapture};
pub use room::{RoomHandle, RoomManager};
pub use settings::{RoomSettings, SettingsError, SettingsResolved, SettingsSources, ValueSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_starts_empty() {
        let manager = RoomManager::new(RoomSettings::default()).expect("manager");

        assert_eq!(manager.event_bus().subscriber_count(), 0);
        assert!(manager.room_ids().is_empty());
    }
}
