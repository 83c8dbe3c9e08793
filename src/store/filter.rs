use serde::Deserialize;

/// Optional query-string filters for the public pet listing. Supplied
/// filters are combined with AND; absent ones are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetFilter {
    #[serde(default, rename = "tipo")]
    pub kind: Option<String>,
    #[serde(default, rename = "estado")]
    pub status: Option<String>,
    #[serde(default, rename = "raza")]
    pub breed: Option<String>,
    #[serde(default, rename = "color_principal")]
    pub color: Option<String>,
    #[serde(default, rename = "ubicacion_ultima")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    /// Case-insensitive substring.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate<'a> {
    pub column: &'static str,
    pub mode: MatchMode,
    pub value: &'a str,
}

impl Predicate<'_> {
    /// Value to bind against the SQL placeholder.
    pub fn bind_value(&self) -> String {
        match self.mode {
            MatchMode::Exact => self.value.to_string(),
            MatchMode::Contains => format!("%{}%", self.value),
        }
    }
}

impl PetFilter {
    /// Supplied filters in a fixed column order. Empty strings count as absent.
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let candidates = [
            ("tipo", MatchMode::Exact, &self.kind),
            ("estado", MatchMode::Exact, &self.status),
            ("raza", MatchMode::Contains, &self.breed),
            ("color_principal", MatchMode::Contains, &self.color),
            ("ubicacion_ultima", MatchMode::Contains, &self.location),
        ];

        candidates
            .into_iter()
            .filter_map(|(column, mode, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|value| Predicate {
                        column,
                        mode,
                        value,
                    })
            })
            .collect()
    }
}
