use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::{Result, SketchError};

pub const ELEMENT_COUNT: u8 = 109;

pub const PROTON_MASS: f64 = 1.00727647;
pub const NEUTRON_MASS: f64 = 1.008665;
pub const ELECTRON_MASS: f64 = 0.000548579909;

pub const fn amu_to_kg(amu: f64) -> f64 {
    amu * 1.67377e-27
}

pub const fn kg_to_amu(kg: f64) -> f64 {
    kg * 6.0229552894949e+26
}

const NAMES: [&str; ELEMENT_COUNT as usize] = [
    "Hydrogen", "Helium", "Lithium", "Beryllium", "Boron", "Carbon", "Nitrogen", "Oxygen",
    "Fluorine", "Neon", "Sodium", "Magnesium", "Aluminum", "Silicon", "Phosphorus", "Sulfur",
    "Chlorine", "Argon", "Potassium", "Calcium", "Scandium", "Titanium", "Vanadium", "Chromium",
    "Manganese", "Iron", "Cobalt", "Nickel", "Copper", "Zinc", "Gallium", "Germanium", "Arsenic",
    "Selenium", "Bromine", "Krypton", "Rubidium", "Strontium", "Yttrium", "Zirconium", "Niobium",
    "Molybdenum", "Technetium", "Ruthenium", "Rhodium", "Palladium", "Silver", "Cadmium",
    "Indium", "Tin", "Antimony", "Tellurium", "Iodine", "Xenon", "Cesium", "Barium", "Lanthanum",
    "Cerium", "Praseodymium", "Neodymium", "Promethium", "Samarium", "Europium", "Gadolinium",
    "Terbium", "Dysprosium", "Holmium", "Erbium", "Thulium", "Ytterbium", "Lutetium", "Hafnium",
    "Tantalum", "Tungsten", "Rhenium", "Osmium", "Iridium", "Platinum", "Gold", "Mercury",
    "Thallium", "Lead", "Bismuth", "Polonium", "Astatine", "Radon", "Francium", "Radium",
    "Actinium", "Thorium", "Protactinium", "Uranium", "Neptunium", "Plutonium", "Americium",
    "Curium", "Berkelium", "Californium", "Einsteinium", "Fermium", "Mendelevium", "Nobelium",
    "Lawrencium", "Rutherfordium", "Dubnium", "Seaborgium", "Bohrium", "Hassium", "Meitnerium",
];

const SYMBOLS: [&str; ELEMENT_COUNT as usize] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt",
];

pub const fn element_name(z: u8) -> Option<&'static str> {
    if z == 0 || z > ELEMENT_COUNT {
        return None;
    }
    Some(NAMES[z as usize - 1])
}

pub const fn element_symbol(z: u8) -> Option<&'static str> {
    if z == 0 || z > ELEMENT_COUNT {
        return None;
    }
    Some(SYMBOLS[z as usize - 1])
}

pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|candidate| *candidate == symbol)
        .map(|index| index as u8 + 1)
}

pub mod shell {
    /// s, p, d and f.
    pub const SUBSHELLS: [u8; 4] = [2, 6, 10, 14];

    /// Highest subshell filled in each of the K through Q shells.
    pub const CONFIGURATIONS: [usize; 7] = [0, 1, 2, 3, 3, 2, 0];

    pub const fn configuration_electrons(configuration: usize) -> u8 {
        let mut total = 0;
        let mut i = 0;
        while i <= configuration {
            total += SUBSHELLS[i];
            i += 1;
        }
        total
    }

    pub const fn shell_electrons(shell: usize) -> u8 {
        configuration_electrons(CONFIGURATIONS[shell])
    }

    pub const CAPACITIES: [u8; 7] = {
        let mut capacities = [0; 7];
        let mut n = 0;
        while n < capacities.len() {
            capacities[n] = shell_electrons(n);
            n += 1;
        }
        capacities
    };

    const _: () = assert!(configuration_electrons(1) == 8);
    const _: () = assert!(CAPACITIES[4] == 32);
    const _: () = assert!(CAPACITIES[6] == 2);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    AlkaliMetal,
    AlkalineEarthMetal,
    TransitionMetal,
    PostTransitionMetal,
    Metalloid,
    ReactiveNonmetal,
    NobleGas,
    Lanthanide,
    Actinide,
    Unknown,
}

impl Group {
    pub const fn as_str(self) -> &'static str {
        match self {
            Group::AlkaliMetal => "alkali metal",
            Group::AlkalineEarthMetal => "alkaline earth metal",
            Group::TransitionMetal => "transition metal",
            Group::PostTransitionMetal => "post-transition metal",
            Group::Metalloid => "metalloid",
            Group::ReactiveNonmetal => "reactive nonmetal",
            Group::NobleGas => "noble gas",
            Group::Lanthanide => "lanthanide",
            Group::Actinide => "actinide",
            Group::Unknown => "unknown",
        }
    }

    pub const fn of(z: u8) -> Group {
        match z {
            3 | 11 | 19 | 37 | 55 | 87 => Group::AlkaliMetal,
            4 | 12 | 20 | 38 | 56 | 88 => Group::AlkalineEarthMetal,
            2 | 10 | 18 | 36 | 54 | 86 => Group::NobleGas,
            5 | 14 | 32 | 33 | 51 | 52 | 85 => Group::Metalloid,
            1 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 34 | 35 | 53 => Group::ReactiveNonmetal,
            13 | 31 | 49 | 50 | 81 | 82 | 83 | 84 => Group::PostTransitionMetal,
            57..=71 => Group::Lanthanide,
            89..=103 => Group::Actinide,
            21..=30 | 39..=48 | 72..=80 | 104..=108 => Group::TransitionMetal,
            _ => Group::Unknown,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Atom {
    pub protons: u8,
    pub neutrons: u8,
    pub electrons: u8,
}

pub const HYDROGEN: Atom = Atom::new(1, 0, 1);
pub const HELIUM: Atom = Atom::new(2, 2, 2);
pub const CARBON: Atom = Atom::new(6, 6, 6);
pub const NITROGEN: Atom = Atom::new(7, 7, 7);
pub const OXYGEN: Atom = Atom::new(8, 8, 8);

impl Atom {
    pub const fn new(protons: u8, neutrons: u8, electrons: u8) -> Self {
        Self {
            protons,
            neutrons,
            electrons,
        }
    }

    /// An uncharged atom with a typical neutron count.
    pub const fn neutral(z: u8) -> Self {
        let neutrons = match z {
            1 => 0,
            0..=20 => z,
            21..=40 => z + z / 8,
            41..=80 => z + z / 3,
            _ => ((z as u16 * 3) / 2) as u8,
        };
        Self::new(z, neutrons, z)
    }

    /// Index of the outermost occupied shell.
    pub const fn valence_shell(&self) -> usize {
        let mut remaining = self.electrons;
        let mut n = 0;
        while n < shell::CAPACITIES.len() {
            let capacity = shell::CAPACITIES[n];
            if remaining <= capacity {
                break;
            }
            remaining -= capacity;
            n += 1;
        }
        n
    }

    pub const fn valence_electrons(&self) -> u8 {
        let mut remaining = self.electrons;
        let mut n = 0;
        while n < shell::CAPACITIES.len() {
            let capacity = shell::CAPACITIES[n];
            if remaining <= capacity {
                break;
            }
            remaining -= capacity;
            n += 1;
        }
        remaining
    }

    pub const fn valence_shell_full(&self) -> bool {
        let mut remaining = self.electrons;
        let mut n = 0;
        while n < shell::CAPACITIES.len() {
            let capacity = shell::CAPACITIES[n];
            if remaining == capacity {
                return true;
            }
            if remaining < capacity {
                return false;
            }
            remaining -= capacity;
            n += 1;
        }
        false
    }

    pub const fn charge(&self) -> i16 {
        self.protons as i16 - self.electrons as i16
    }

    /// Rest mass in atomic mass units.
    pub const fn mass(&self) -> f64 {
        self.protons as f64 * PROTON_MASS
            + self.neutrons as f64 * NEUTRON_MASS
            + self.electrons as f64 * ELECTRON_MASS
    }

    pub const fn group(&self) -> Group {
        Group::of(self.protons)
    }

    pub const fn is_noble_gas(&self) -> bool {
        matches!(self.group(), Group::NobleGas)
    }

    pub const fn name(&self) -> Option<&'static str> {
        element_name(self.protons)
    }

    pub const fn symbol(&self) -> Option<&'static str> {
        element_symbol(self.protons)
    }
}

const _: () = assert!(HELIUM.valence_shell_full());
const _: () = assert!(CARBON.valence_electrons() == 4);

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Molecule<const N: usize> {
    pub atoms: [Atom; N],
}

pub const DOPAMINE: Molecule<22> = Molecule::new([
    CARBON, CARBON, CARBON, CARBON, CARBON, CARBON, CARBON, CARBON, HYDROGEN, HYDROGEN, HYDROGEN,
    HYDROGEN, HYDROGEN, HYDROGEN, HYDROGEN, HYDROGEN, HYDROGEN, HYDROGEN, HYDROGEN, NITROGEN,
    OXYGEN, OXYGEN,
]);

impl<const N: usize> Molecule<N> {
    pub const fn new(atoms: [Atom; N]) -> Self {
        Self { atoms }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub const fn mass(&self) -> f64 {
        let mut total = 0.0;
        let mut i = 0;
        while i < N {
            total += self.atoms[i].mass();
            i += 1;
        }
        total
    }

    pub fn formula(&self) -> Formula {
        self.atoms.iter().map(|atom| atom.protons).collect()
    }
}

/// Element counts keyed by atomic number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Formula {
    counts: BTreeMap<u8, u32>,
}

impl Formula {
    /// Fails when the total number of atoms would no longer fit a `u32`.
    pub fn add(&mut self, z: u8, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if self.atoms().checked_add(count).is_none() {
            return Err(SketchError::Formula(format!(
                "{count} more atoms of element {z} overflows the formula"
            )));
        }
        *self.counts.entry(z).or_default() += count;
        Ok(())
    }

    pub fn count(&self, z: u8) -> u32 {
        self.counts.get(&z).copied().unwrap_or(0)
    }

    pub fn atoms(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn mass(&self) -> f64 {
        self.counts
            .iter()
            .map(|(z, count)| Atom::neutral(*z).mass() * f64::from(*count))
            .sum()
    }

    /// Hill order: carbon, then hydrogen, then everything else alphabetically.
    /// Without carbon, everything is alphabetical.
    fn hill_order(&self) -> Vec<(&'static str, u32)> {
        let mut entries: Vec<(&'static str, u32)> = self
            .counts
            .iter()
            .filter_map(|(z, count)| element_symbol(*z).map(|symbol| (symbol, *count)))
            .collect();
        let has_carbon = self.counts.contains_key(&6);
        entries.sort_by_key(|(symbol, _)| {
            let rank = match *symbol {
                "C" if has_carbon => 0,
                "H" if has_carbon => 1,
                _ => 2,
            };
            (rank, *symbol)
        });
        entries
    }
}

impl FromIterator<u8> for Formula {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut formula = Formula::default();
        for z in iter {
            if formula.add(z, 1).is_err() {
                break;
            }
        }
        formula
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, count) in self.hill_order() {
            f.write_str(symbol)?;
            if count > 1 {
                write!(f, "{count}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Formula {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        let mut formula = Formula::default();
        let mut chars = s.trim().chars().peekable();
        if chars.peek().is_none() {
            return Err(SketchError::Formula("empty formula".into()));
        }
        while let Some(c) = chars.next() {
            if !c.is_ascii_uppercase() {
                return Err(SketchError::Formula(format!("unexpected {c:?} in {s:?}")));
            }
            let mut symbol = c.to_string();
            while let Some(lower) = chars.next_if(|c| c.is_ascii_lowercase()) {
                symbol.push(lower);
            }
            let mut digits = String::new();
            while let Some(digit) = chars.next_if(|c| c.is_ascii_digit()) {
                digits.push(digit);
            }
            let count = if digits.is_empty() {
                1
            } else {
                digits
                    .parse()
                    .map_err(|_| SketchError::Formula(format!("bad count {digits:?} in {s:?}")))?
            };
            let z = atomic_number(&symbol).ok_or(SketchError::UnknownElement(symbol))?;
            formula.add(z, count)?;
        }
        Ok(formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_symbols_line_up() {
        assert_eq!(element_name(1), Some("Hydrogen"));
        assert_eq!(element_symbol(1), Some("H"));
        assert_eq!(element_name(109), Some("Meitnerium"));
        assert_eq!(element_name(0), None);
        assert_eq!(element_symbol(110), None);
        assert_eq!(atomic_number("Fe"), Some(26));
        assert_eq!(atomic_number("Xx"), None);
    }

    #[test]
    fn shell_capacities() {
        assert_eq!(shell::CAPACITIES, [2, 8, 18, 32, 32, 18, 2]);
    }

    #[test]
    fn valence_follows_the_capacity_model() {
        assert_eq!(HYDROGEN.valence_shell(), 0);
        assert_eq!(HYDROGEN.valence_electrons(), 1);
        assert_eq!(OXYGEN.valence_shell(), 1);
        assert_eq!(OXYGEN.valence_electrons(), 6);
        assert!(Atom::neutral(10).valence_shell_full());
        assert!(!OXYGEN.valence_shell_full());
    }

    #[test]
    fn groups_cover_the_table() {
        assert_eq!(Atom::neutral(11).group(), Group::AlkaliMetal);
        assert_eq!(Atom::neutral(26).group(), Group::TransitionMetal);
        assert_eq!(Atom::neutral(60).group(), Group::Lanthanide);
        assert_eq!(Atom::neutral(92).group(), Group::Actinide);
        assert_eq!(HYDROGEN.group(), Group::ReactiveNonmetal);
        assert!(Atom::neutral(18).is_noble_gas());
        assert!(!CARBON.is_noble_gas());
        assert_eq!(Group::of(109), Group::Unknown);
    }

    #[test]
    fn ions_carry_charge() {
        let chloride = Atom::new(17, 18, 18);
        assert_eq!(chloride.charge(), -1);
        assert_eq!(HELIUM.charge(), 0);
    }

    #[test]
    fn masses_in_amu_and_kg() {
        assert!((HYDROGEN.mass() - 1.007825).abs() < 1e-5);
        assert!((amu_to_kg(1.0) - 1.67377e-27).abs() < 1e-35);
        assert!((kg_to_amu(1.0e-26) - 6.0229552894949).abs() < 1e-9);
    }

    #[test]
    fn dopamine_formula() {
        assert_eq!(DOPAMINE.len(), 22);
        assert_eq!(DOPAMINE.formula().to_string(), "C8H11NO2");
        let parsed: Formula = "C8H11NO2".parse().unwrap();
        assert_eq!(parsed, DOPAMINE.formula());
        assert!((parsed.mass() - DOPAMINE.mass()).abs() < 1e-9);
    }

    #[test]
    fn hill_order_without_carbon_is_alphabetical() {
        let water: Formula = "OH2".parse().unwrap();
        assert_eq!(water.to_string(), "H2O");
        let salt: Formula = "ClNa".parse().unwrap();
        assert_eq!(salt.to_string(), "ClNa");
    }

    #[test]
    fn bad_formulas_are_rejected() {
        assert!(matches!("Qq2".parse::<Formula>(), Err(SketchError::UnknownElement(_))));
        assert!(matches!("2H".parse::<Formula>(), Err(SketchError::Formula(_))));
        assert!("".parse::<Formula>().is_err());
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        assert!(matches!("H4294967295H".parse::<Formula>(), Err(SketchError::Formula(_))));
        assert!(matches!("H4294967295O".parse::<Formula>(), Err(SketchError::Formula(_))));
        let formula: Formula = "H4294967295".parse().unwrap();
        assert_eq!(formula.atoms(), u32::MAX);
    }
}
