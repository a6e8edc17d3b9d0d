mod car;
mod types;

pub use car::{CarNumber, CarNumberError};
pub use types::{
    Driver, DriverId, Participant, ParticipantId, Race, RaceId, RaceStatus, Rollover, Team,
    TeamId, WinningCars,
};
