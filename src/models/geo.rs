//! Brazilian federative units keyed by IBGE code
//!
//! Used to label region codes in the bundle. Codes not in the table are still
//! aggregated, only without a label.

use serde::Serialize;

/// One federative unit (state)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateInfo {
    /// Two-digit IBGE code, e.g. `"42"`
    pub ibge_code: &'static str,
    /// Abbreviation, e.g. `"SC"`
    pub uf: &'static str,
    pub name: &'static str,
}

const fn state(ibge_code: &'static str, uf: &'static str, name: &'static str) -> StateInfo {
    StateInfo { ibge_code, uf, name }
}

pub const STATES: &[StateInfo] = &[
    state("11", "RO", "Rondônia"),
    state("12", "AC", "Acre"),
    state("13", "AM", "Amazonas"),
    state("14", "RR", "Roraima"),
    state("15", "PA", "Pará"),
    state("16", "AP", "Amapá"),
    state("17", "TO", "Tocantins"),
    state("21", "MA", "Maranhão"),
    state("22", "PI", "Piauí"),
    state("23", "CE", "Ceará"),
    state("24", "RN", "Rio Grande do Norte"),
    state("25", "PB", "Paraíba"),
    state("26", "PE", "Pernambuco"),
    state("27", "AL", "Alagoas"),
    state("28", "SE", "Sergipe"),
    state("29", "BA", "Bahia"),
    state("31", "MG", "Minas Gerais"),
    state("32", "ES", "Espírito Santo"),
    state("33", "RJ", "Rio de Janeiro"),
    state("35", "SP", "São Paulo"),
    state("41", "PR", "Paraná"),
    state("42", "SC", "Santa Catarina"),
    state("43", "RS", "Rio Grande do Sul"),
    state("50", "MS", "Mato Grosso do Sul"),
    state("51", "MT", "Mato Grosso"),
    state("52", "GO", "Goiás"),
    state("53", "DF", "Distrito Federal"),
];

/// Look up a state by its IBGE code
#[must_use]
pub fn state_by_code(code: &str) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.ibge_code == code)
}

/// `"SC - Santa Catarina"` style label for a region code
#[must_use]
pub fn region_label(code: &str) -> Option<String> {
    state_by_code(code).map(|s| format!("{} - {}", s.uf, s.name))
}
