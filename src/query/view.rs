//! Predefined multi-table views

/// One output column of a view and the expression that produces it
#[derive(Debug)]
pub struct ViewColumn {
    pub name: &'static str,
    pub expr: &'static str,
}

#[derive(Debug)]
pub struct JoinView {
    pub name: &'static str,
    pub from: &'static str,
    pub columns: &'static [ViewColumn],
    pub order_by: &'static str,
}

impl JoinView {
    pub fn column(&self, name: &str) -> Option<&ViewColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

const fn col(name: &'static str, expr: &'static str) -> ViewColumn {
    ViewColumn { name, expr }
}

/// Flights with their aircraft and both pilot slots. The second pilot is
/// optional, so it is LEFT joined.
pub static FLIGHT_OVERVIEW: JoinView = JoinView {
    name: "flight_overview",
    from: "flight AS f \
           INNER JOIN aircraft AS a ON f.aircraft_id = a.aircraft_id \
           INNER JOIN pilot AS p1 ON f.pilot_1 = p1.staff_id \
           LEFT JOIN pilot AS p2 ON f.pilot_2 = p2.staff_id",
    columns: &[
        col("flight_id", "f.flight_id"),
        col("start_airport", "f.start_airport"),
        col("destination_airport", "f.destination_airport"),
        col("departure_date", "f.departure_date"),
        col("aircraft_id", "a.aircraft_id"),
        col("aircraft_age", "a.age"),
        col("aircraft_capacity", "a.capacity"),
        col("pilot_1", "f.pilot_1"),
        col("pilot_1_name", "p1.first_name || ' ' || p1.last_name"),
        col("pilot_2", "f.pilot_2"),
        col("pilot_2_name", "p2.first_name || ' ' || p2.last_name"),
    ],
    order_by: "f.flight_id",
};

pub static ALL_VIEWS: &[&JoinView] = &[&FLIGHT_OVERVIEW];

/// Look up a view by name; `all` is kept as an alias for the flight overview
pub fn get_view(name: &str) -> Option<&'static JoinView> {
    if name == "all" {
        return Some(&FLIGHT_OVERVIEW);
    }
    ALL_VIEWS.iter().find(|v| v.name == name).copied()
}
