use super::{Atom, Basis, Contraction, GtopwPrimitive, Shell};
use num_complex::Complex64;
use std::fmt;
use std::fs;
use std::iter::{Enumerate, Peekable};
use std::path::{Path, PathBuf};
use std::str::{FromStr, Lines};

const START_TOKEN: &str = "$BASIS";
const END_TOKEN: &str = "$END";

#[derive(Debug)]
pub enum BasisError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { line: usize, message: String },
}

impl BasisError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        BasisError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for BasisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            BasisError::Io { path, source } => {
                write!(f, "Unable to read basis file {}: {}", path.display(), source)
            }
            BasisError::Parse { line, message } => {
                write!(f, "Invalid basis set in line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for BasisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BasisError::Io { source, .. } => Some(source),
            BasisError::Parse { .. } => None,
        }
    }
}

type LineIter<'a> = Peekable<Enumerate<Lines<'a>>>;

/// Reads the `$BASIS ... $END` block from a file.
pub fn read_basis(path: &Path) -> Result<Basis, BasisError> {
    let text: String = fs::read_to_string(path).map_err(|source| BasisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    text.parse()
}

impl FromStr for Basis {
    type Err = BasisError;

    /// Every atom starts with a line `label charge x y z`, followed by its contractions.
    /// A contraction is a header `<shell> <number of primitives>` and one line per
    /// primitive `index exponent Re(c) Im(c) kx ky kz`. Atoms are separated by blank lines.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut lines: LineIter = text.lines().enumerate().peekable();

        // everything in front of the basis block belongs to other sections of the input
        loop {
            match lines.next() {
                Some((_, line)) if line.trim() == START_TOKEN => break,
                Some(_) => continue,
                None => {
                    return Err(BasisError::parse(
                        text.lines().count(),
                        format!("no {} block found", START_TOKEN),
                    ))
                }
            }
        }

        let mut atoms: Vec<Atom> = Vec::new();
        loop {
            let (idx, line) = match lines.next() {
                Some(entry) => entry,
                None => {
                    return Err(BasisError::parse(
                        text.lines().count(),
                        format!("{} block is not terminated by {}", START_TOKEN, END_TOKEN),
                    ))
                }
            };
            let trimmed: &str = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == END_TOKEN {
                break;
            }
            let mut atom: Atom = parse_atom_header(idx + 1, trimmed)?;
            atom.contractions = parse_contractions(&mut lines)?;
            atoms.push(atom);
        }
        Ok(Basis { atoms })
    }
}

fn parse_number<T: FromStr>(line: usize, token: Option<&str>, what: &str) -> Result<T, BasisError> {
    let token: &str = token.ok_or_else(|| BasisError::parse(line, format!("missing {}", what)))?;
    token
        .parse::<T>()
        .map_err(|_| BasisError::parse(line, format!("cannot read {} from '{}'", what, token)))
}

fn parse_atom_header(line: usize, text: &str) -> Result<Atom, BasisError> {
    let mut tokens = text.split_whitespace();
    let label: String = tokens
        .next()
        .ok_or_else(|| BasisError::parse(line, "missing atom label"))?
        .to_owned();
    let charge: f64 = parse_number(line, tokens.next(), "nuclear charge")?;
    let mut position: [f64; 3] = [0.0; 3];
    for (coord, name) in position.iter_mut().zip(["x", "y", "z"].iter()) {
        *coord = parse_number(line, tokens.next(), name)?;
    }
    Ok(Atom {
        label,
        charge,
        position,
        contractions: Vec::new(),
    })
}

fn parse_contractions(lines: &mut LineIter) -> Result<Vec<Contraction>, BasisError> {
    let mut contractions: Vec<Contraction> = Vec::new();
    loop {
        let (idx, line) = match lines.peek() {
            Some(&entry) => entry,
            None => break,
        };
        let trimmed: &str = line.trim();
        // the terminating token is left for the caller
        if trimmed == END_TOKEN {
            break;
        }
        lines.next();
        if trimmed.is_empty() {
            break;
        }
        let mut tokens = trimmed.split_whitespace();
        let shell_token: &str = tokens.next().unwrap_or("");
        let shell: Shell = shell_token
            .chars()
            .next()
            .filter(|_| shell_token.len() == 1)
            .and_then(Shell::from_char)
            .ok_or_else(|| BasisError::parse(idx + 1, format!("unknown shell '{}'", shell_token)))?;
        let n_primitives: usize = parse_number(idx + 1, tokens.next(), "number of primitives")?;

        let mut primitives: Vec<GtopwPrimitive> = Vec::with_capacity(n_primitives);
        for _ in 0..n_primitives {
            let (pidx, pline) = lines.next().ok_or_else(|| {
                BasisError::parse(idx + 1, "unexpected end of file inside a contraction")
            })?;
            primitives.push(parse_primitive(pidx + 1, pline)?);
        }
        contractions.push(Contraction { shell, primitives });
    }
    Ok(contractions)
}

fn parse_primitive(line: usize, text: &str) -> Result<GtopwPrimitive, BasisError> {
    let mut tokens = text.split_whitespace();
    let _index: usize = parse_number(line, tokens.next(), "primitive index")?;
    let exponent: f64 = parse_number(line, tokens.next(), "exponent")?;
    let re: f64 = parse_number(line, tokens.next(), "real part of the coefficient")?;
    let im: f64 = parse_number(line, tokens.next(), "imaginary part of the coefficient")?;
    let mut k: [f64; 3] = [0.0; 3];
    for (component, name) in k.iter_mut().zip(["kx", "ky", "kz"].iter()) {
        *component = parse_number(line, tokens.next(), name)?;
    }
    Ok(GtopwPrimitive {
        exponent,
        coefficient: Complex64::new(re, im),
        k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::Representation;
    use approx::assert_abs_diff_eq;

    const WATER_LIKE: &str = "\
$CONTROL
GAUGE length
$END
$BASIS
O 8.0 0.0 0.0 0.0
S 2
  1 5.484671660e+03 1.831074430e-03 0.0 0.0 0.0 0.0
  2 8.252349460e+02 1.395017220e-02 0.0 0.0 0.0 0.0
P 1
  1 1.0 1.0 0.0 0.0 0.0 0.5

H 1.0 0.0 1.43 -1.1
S 1
  1 0.5 1.0 0.0 0.0 0.0 0.0
D 1
  1 0.8 0.5 -0.5 0.1 0.2 0.3
$END
";

    #[test]
    fn parses_atoms_and_contractions() {
        let basis: Basis = WATER_LIKE.parse().unwrap();
        assert_eq!(basis.atoms.len(), 2);
        let oxygen = &basis.atoms[0];
        assert_eq!(oxygen.label, "O");
        assert_abs_diff_eq!(oxygen.charge, 8.0);
        assert_eq!(oxygen.contractions.len(), 2);
        assert_eq!(oxygen.contractions[0].primitives.len(), 2);
        assert_abs_diff_eq!(oxygen.contractions[1].primitives[0].k[2], 0.5);
        let hydrogen = &basis.atoms[1];
        assert_abs_diff_eq!(hydrogen.position[2], -1.1);
        assert_eq!(hydrogen.contractions[1].shell, Shell::D);
        assert_abs_diff_eq!(hydrogen.contractions[1].primitives[0].coefficient.im, -0.5);

        assert_eq!(basis.functions_number(Representation::Cartesian), 1 + 3 + 1 + 6);
        assert_eq!(basis.functions_number(Representation::Spherical), 1 + 3 + 1 + 5);
    }

    #[test]
    fn written_basis_can_be_read_again() {
        let basis: Basis = WATER_LIKE.parse().unwrap();
        let text: String = format!("{}\n{}{}\n", START_TOKEN, basis, END_TOKEN);
        let reread: Basis = text.parse().unwrap();
        assert_eq!(basis, reread);
    }

    #[test]
    fn unknown_shell_reports_line() {
        let text = "$BASIS\nH 1.0 0.0 0.0 0.0\nX 1\n  1 0.5 1.0 0.0 0.0 0.0 0.0\n$END\n";
        match text.parse::<Basis>() {
            Err(BasisError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn missing_block_is_an_error() {
        assert!("H 1.0 0.0 0.0 0.0\n".parse::<Basis>().is_err());
        assert!("$BASIS\nH 1.0 0.0 0.0 0.0\nS 1\n  1 0.5 1.0 0.0 0.0 0.0 0.0\n"
            .parse::<Basis>()
            .is_err());
    }
}
