use crate::domain::entities::{ServiceType, VehicleType};

/// Fixed price list. The match is exhaustive over the enum product, so an
/// unmapped combination is a compile error rather than a runtime default.
pub const fn price(service: ServiceType, vehicle: VehicleType) -> u32 {
    match (vehicle, service) {
        (VehicleType::Bike, ServiceType::TubePatch) => 150,
        (VehicleType::Bike, ServiceType::TubelessPlug) => 200,
        (VehicleType::Bike, ServiceType::Tow) => 1500,
        (VehicleType::Car, ServiceType::TubePatch) => 400,
        (VehicleType::Car, ServiceType::TubelessPlug) => 500,
        (VehicleType::Car, ServiceType::Tow) => 3000,
    }
}
