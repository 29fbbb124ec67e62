/// Which end of a sequence padding or truncation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Pre,
    Post,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Pre => "pre",
            Side::Post => "post",
        }
    }
}

pub const PAD_VALUE: i64 = 0;

/// Token ids padded or truncated to the model's fixed input length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedSequence {
    ids: Vec<i64>,
}

impl PaddedSequence {
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

pub fn pad_sequence(
    ids: &[i64],
    max_len: usize,
    padding: Side,
    truncating: Side,
) -> PaddedSequence {
    let kept = if ids.len() > max_len {
        match truncating {
            Side::Pre => &ids[ids.len() - max_len..],
            Side::Post => &ids[..max_len],
        }
    } else {
        ids
    };

    let fill = max_len - kept.len();
    let mut out = Vec::with_capacity(max_len);
    match padding {
        Side::Pre => {
            out.resize(fill, PAD_VALUE);
            out.extend_from_slice(kept);
        }
        Side::Post => {
            out.extend_from_slice(kept);
            out.resize(max_len, PAD_VALUE);
        }
    }
    PaddedSequence { ids: out }
}
