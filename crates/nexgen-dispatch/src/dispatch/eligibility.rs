use super::domain::{Order, Vehicle, VehicleId};
use serde::Serialize;

/// First hard constraint a vehicle failed for an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Ineligibility {
    InsufficientCapacity { capacity_kg: f64, required_kg: f64 },
    IncompatibleCategory { category: String },
    Unavailable { status: String },
}

impl Ineligibility {
    pub fn summary(&self) -> String {
        match self {
            Ineligibility::InsufficientCapacity {
                capacity_kg,
                required_kg,
            } => format!("capacity {capacity_kg:.0} kg below required {required_kg:.0} kg"),
            Ineligibility::IncompatibleCategory { category } => {
                format!("does not carry {category} orders")
            }
            Ineligibility::Unavailable { status } => format!("not available ({status})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedVehicle {
    pub vehicle_id: VehicleId,
    #[serde(flatten)]
    pub reason: Ineligibility,
}

/// Check capacity, category and availability, in that order.
pub fn check(order: &Order, vehicle: &Vehicle) -> Result<(), Ineligibility> {
    if vehicle.capacity_kg < order.required_capacity_kg {
        return Err(Ineligibility::InsufficientCapacity {
            capacity_kg: vehicle.capacity_kg,
            required_kg: order.required_capacity_kg,
        });
    }

    if !vehicle.categories.supports(&order.category) {
        return Err(Ineligibility::IncompatibleCategory {
            category: order.category.clone(),
        });
    }

    if !vehicle.available {
        return Err(Ineligibility::Unavailable {
            status: vehicle.status.clone(),
        });
    }

    Ok(())
}

/// Vehicles able to serve `order`, in input order. Empty is a valid answer.
pub fn eligible_vehicles<'a, I>(order: &Order, vehicles: I) -> Vec<&'a Vehicle>
where
    I: IntoIterator<Item = &'a Vehicle>,
{
    partition(order, vehicles).0
}

/// Split the fleet into eligible vehicles and explained exclusions.
pub fn partition<'a, I>(order: &Order, vehicles: I) -> (Vec<&'a Vehicle>, Vec<ExcludedVehicle>)
where
    I: IntoIterator<Item = &'a Vehicle>,
{
    let mut eligible = Vec::new();
    let mut excluded = Vec::new();

    for vehicle in vehicles {
        match check(order, vehicle) {
            Ok(()) => eligible.push(vehicle),
            Err(reason) => excluded.push(ExcludedVehicle {
                vehicle_id: vehicle.vehicle_id.clone(),
                reason,
            }),
        }
    }

    (eligible, excluded)
}
