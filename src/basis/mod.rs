//! GTOPW basis sets: the textual `$BASIS` block and the number of basis functions it
//! spans. Only the sizes enter the propagation, the basis itself is needed to write the
//! input deck of the integral program.
mod parser;

pub use parser::{read_basis, BasisError};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cartesian or spherical harmonic basis functions.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    Cartesian,
    Spherical,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Representation::Cartesian => write!(f, "cartesian"),
            Representation::Spherical => write!(f, "spherical"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Shell {
    S,
    P,
    D,
    F,
    G,
    H,
    I,
    K,
    L,
}

const SHELL_LABELS: [char; 9] = ['S', 'P', 'D', 'F', 'G', 'H', 'I', 'K', 'L'];
const SHELLS: [Shell; 9] = [
    Shell::S,
    Shell::P,
    Shell::D,
    Shell::F,
    Shell::G,
    Shell::H,
    Shell::I,
    Shell::K,
    Shell::L,
];

impl Shell {
    pub fn from_char(c: char) -> Option<Self> {
        SHELL_LABELS
            .iter()
            .position(|&label| label == c.to_ascii_uppercase())
            .map(|idx| SHELLS[idx])
    }

    pub fn label(&self) -> char {
        SHELL_LABELS[self.angular_momentum()]
    }

    pub fn angular_momentum(&self) -> usize {
        *self as usize
    }

    /// Number of cartesian components (l+1)(l+2)/2.
    pub fn n_cartesian(&self) -> usize {
        let l: usize = self.angular_momentum();
        (l + 1) * (l + 2) / 2
    }

    /// Number of spherical harmonic components 2l+1.
    pub fn n_spherical(&self) -> usize {
        2 * self.angular_momentum() + 1
    }

    pub fn functions_number(&self, representation: Representation) -> usize {
        match representation {
            Representation::Cartesian => self.n_cartesian(),
            Representation::Spherical => self.n_spherical(),
        }
    }
}

/// A Gaussian type orbital multiplied by a plane wave exp(i k r).
#[derive(Clone, Debug, PartialEq)]
pub struct GtopwPrimitive {
    pub exponent: f64,
    pub coefficient: Complex64,
    pub k: [f64; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Contraction {
    pub shell: Shell,
    pub primitives: Vec<GtopwPrimitive>,
}

impl Contraction {
    pub fn functions_number(&self, representation: Representation) -> usize {
        self.shell.functions_number(representation)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub label: String,
    pub charge: f64,
    pub position: [f64; 3],
    pub contractions: Vec<Contraction>,
}

impl Atom {
    pub fn functions_number(&self, representation: Representation) -> usize {
        self.contractions
            .iter()
            .map(|c| c.functions_number(representation))
            .sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Basis {
    pub atoms: Vec<Atom>,
}

impl Basis {
    /// Dimension n of all one-electron operator matrices.
    pub fn functions_number(&self, representation: Representation) -> usize {
        self.atoms
            .iter()
            .map(|a| a.functions_number(representation))
            .sum()
    }

    pub fn max_shell(&self) -> Option<Shell> {
        self.atoms
            .iter()
            .flat_map(|a| a.contractions.iter().map(|c| c.shell))
            .max()
    }
}

impl fmt::Display for GtopwPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "          {:>18.9e}          {:>18.9e}{:>18.9e}          {:>10.5}{:>10.5}{:>10.5}",
            self.exponent, self.coefficient.re, self.coefficient.im, self.k[0], self.k[1], self.k[2]
        )
    }
}

impl fmt::Display for Contraction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}{:>3}", self.shell.label(), self.primitives.len())?;
        for (i, primitive) in self.primitives.iter().enumerate() {
            write!(f, "{:>3}{}", i + 1, primitive)?;
        }
        Ok(())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{}{:>7.2}          {:>10.5}{:>10.5}{:>10.5}",
            self.label, self.charge, self.position[0], self.position[1], self.position[2]
        )?;
        for contraction in self.contractions.iter() {
            write!(f, "{}", contraction)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for atom in self.atoms.iter() {
            write!(f, "{}", atom)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_sizes_match_tables() {
        let cartesian: Vec<usize> = SHELLS.iter().map(|s| s.n_cartesian()).collect();
        let spherical: Vec<usize> = SHELLS.iter().map(|s| s.n_spherical()).collect();
        assert_eq!(cartesian, vec![1, 3, 6, 10, 15, 21, 28, 36, 45]);
        assert_eq!(spherical, vec![1, 3, 5, 7, 9, 11, 13, 15, 17]);
    }

    #[test]
    fn shell_labels() {
        assert_eq!(Shell::from_char('d'), Some(Shell::D));
        assert_eq!(Shell::from_char('K'), Some(Shell::K));
        assert_eq!(Shell::from_char('J'), None);
        assert_eq!(Shell::F.label(), 'F');
    }

    #[test]
    fn basis_size_per_representation() {
        let contraction = |shell| Contraction {
            shell,
            primitives: vec![],
        };
        let basis = Basis {
            atoms: vec![
                Atom {
                    label: String::from("H"),
                    charge: 1.0,
                    position: [0.0; 3],
                    contractions: vec![contraction(Shell::S), contraction(Shell::P)],
                },
                Atom {
                    label: String::from("O"),
                    charge: 8.0,
                    position: [0.0, 0.0, 1.8],
                    contractions: vec![contraction(Shell::S), contraction(Shell::D)],
                },
            ],
        };
        assert_eq!(basis.functions_number(Representation::Cartesian), 1 + 3 + 1 + 6);
        assert_eq!(basis.functions_number(Representation::Spherical), 1 + 3 + 1 + 5);
        assert_eq!(basis.max_shell(), Some(Shell::D));
    }
}
