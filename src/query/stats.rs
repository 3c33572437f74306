use std::fmt;

use super::builder::Statement;

/// Canned reports over the flight data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    FlightsByDestination,
    FlightsByMonth,
    FlightsByMonthAndDestination,
    PilotDuty,
    AverageAircraftAge,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::FlightsByDestination,
        Statistic::FlightsByMonth,
        Statistic::FlightsByMonthAndDestination,
        Statistic::PilotDuty,
        Statistic::AverageAircraftAge,
    ];

    /// Select a report by its menu number (1-5)
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn number(self) -> u8 {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i as u8 + 1)
    }

    pub fn description(self) -> &'static str {
        match self {
            Statistic::FlightsByDestination => "total number of flights (group by destination)",
            Statistic::FlightsByMonth => "total number of flights (group by month)",
            Statistic::FlightsByMonthAndDestination => {
                "total number of flights (group by month and destination)"
            }
            Statistic::PilotDuty => "total pilot duty (group by pilot)",
            Statistic::AverageAircraftAge => "average aircraft age",
        }
    }

    pub fn statement(self) -> Statement {
        let sql = match self {
            Statistic::FlightsByDestination => {
                "SELECT destination_airport, COUNT(*) AS total_flight \
                 FROM flight GROUP BY destination_airport ORDER BY destination_airport"
            }
            Statistic::FlightsByMonth => {
                "SELECT substr(departure_date, 6, 2) AS month, COUNT(*) AS total_flight \
                 FROM flight GROUP BY month ORDER BY month"
            }
            Statistic::FlightsByMonthAndDestination => {
                "SELECT substr(departure_date, 6, 2) AS month, destination_airport, COUNT(*) AS total_flight \
                 FROM flight GROUP BY month, destination_airport ORDER BY month, destination_airport"
            }
            Statistic::PilotDuty => {
                "SELECT p.staff_id, p.first_name || ' ' || p.last_name AS name, d.pilot_duty_count \
                 FROM pilot AS p INNER JOIN ( \
                     SELECT pilot_id, COUNT(*) AS pilot_duty_count FROM ( \
                         SELECT pilot_1 AS pilot_id FROM flight \
                         UNION ALL \
                         SELECT pilot_2 AS pilot_id FROM flight WHERE pilot_2 IS NOT NULL \
                     ) GROUP BY pilot_id \
                 ) AS d ON d.pilot_id = p.staff_id \
                 ORDER BY p.staff_id"
            }
            Statistic::AverageAircraftAge => "SELECT AVG(age) AS average_age FROM aircraft",
        };
        Statement::new(sql, Vec::new())
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_number() {
        assert_eq!(Statistic::from_number(1), Some(Statistic::FlightsByDestination));
        assert_eq!(Statistic::from_number(5), Some(Statistic::AverageAircraftAge));
        assert_eq!(Statistic::from_number(0), None);
        assert_eq!(Statistic::from_number(6), None);
    }

    #[test]
    fn test_numbers_round_trip() {
        for stat in Statistic::ALL {
            assert_eq!(Statistic::from_number(stat.number()), Some(stat));
        }
    }
}
