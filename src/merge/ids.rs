use rand::Rng;

use crate::tokens::TokenKind;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const ID_SUFFIX_LEN: usize = 8;

/// Source of fresh record identifiers.
pub trait IdGenerator {
    fn next_id(&mut self, kind: TokenKind) -> String;
}

/// `edtm_c_` / `edtm_t_` followed by eight random lowercase alphanumerics.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self, kind: TokenKind) -> String {
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ID_ALPHABET.len());
                ID_ALPHABET[idx] as char
            })
            .collect();
        format!("{}{suffix}", kind.id_prefix())
    }
}

/// Deterministic ids (`edtm_c_00000001`, ...) for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: u32,
}

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn next_id(&mut self, kind: TokenKind) -> String {
        self.issued += 1;
        format!("{}{:08}", kind.id_prefix(), self.issued)
    }
}
