//! Deterministic name generation for demo agents and clients.
//!
//! Same RNG seed, same names.

use crate::rng::DeskRng;

/// Deterministic name generator using curated name lists.
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last) deterministically.
    pub fn generate_full_name(rng: &mut DeskRng) -> String {
        let first_name = Self::generate_first_name(rng);
        let last_name = Self::generate_last_name(rng);
        format!("{first_name} {last_name}")
    }

    pub fn generate_first_name(rng: &mut DeskRng) -> &'static str {
        *rng.pick(Self::first_names())
    }

    pub fn generate_last_name(rng: &mut DeskRng) -> &'static str {
        *rng.pick(Self::last_names())
    }

    /// Payroll agreement ("convênio") a consigned-credit sale is booked under.
    pub fn generate_agreement(rng: &mut DeskRng) -> &'static str {
        *rng.pick(Self::agreements())
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Ana", "Bruno", "Camila", "Carlos", "Daniela", "Diego", "Eduarda",
            "Felipe", "Gabriela", "Gustavo", "Helena", "Igor", "Isabela", "João",
            "Juliana", "Lucas", "Larissa", "Marcos", "Mariana", "Mateus", "Natália",
            "Otávio", "Patrícia", "Pedro", "Rafaela", "Rodrigo", "Sabrina", "Thiago",
            "Vanessa", "Vinícius",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Almeida", "Barbosa", "Cardoso", "Carvalho", "Costa", "Dias", "Ferreira",
            "Gomes", "Lima", "Martins", "Melo", "Nascimento", "Oliveira", "Pereira",
            "Ribeiro", "Rocha", "Rodrigues", "Santos", "Silva", "Souza", "Teixeira",
            "Vieira",
        ]
    }

    fn agreements() -> &'static [&'static str] {
        &[
            "INSS", "SIAPE", "Governo SP", "Governo MG", "Prefeitura RJ",
            "Forças Armadas", "TJ-SP", "Governo BA",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Stream;

    #[test]
    fn same_seed_same_names() {
        let mut rng1 = Stream::Roster.rng(12345);
        let mut rng2 = Stream::Roster.rng(12345);

        let name1 = NameGenerator::generate_full_name(&mut rng1);
        let name2 = NameGenerator::generate_full_name(&mut rng2);

        assert_eq!(name1, name2, "Same seed should produce same name");
    }

    #[test]
    fn generates_two_part_names() {
        let mut rng = Stream::Roster.rng(12345);

        for _ in 0..100 {
            let name = NameGenerator::generate_full_name(&mut rng);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert_eq!(parts.len(), 2, "Name should have exactly 2 parts: {name}");
        }
    }

    #[test]
    fn agreements_come_from_the_curated_list() {
        let mut rng = Stream::Sales.rng(7);

        for _ in 0..50 {
            let agreement = NameGenerator::generate_agreement(&mut rng);
            assert!(NameGenerator::agreements().contains(&agreement));
        }
        assert!(NameGenerator::first_names().contains(&NameGenerator::generate_first_name(&mut rng)));
        assert!(NameGenerator::last_names().contains(&NameGenerator::generate_last_name(&mut rng)));
    }
}
