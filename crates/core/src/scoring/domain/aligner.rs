use super::tokenizer::normalize;

/// Outcome of aligning a hypothesis transcript against a reference.
///
/// `substitutions + insertions + deletions` is the minimum edit distance
/// between the two normalized token sequences under unit costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub substitutions: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub reference_words: u32,
}

impl Alignment {
    pub fn errors(&self) -> u32 {
        self.substitutions + self.insertions + self.deletions
    }

    /// Word error rate, `(S+I+D)/N`. Zero when the reference is empty.
    pub fn wer(&self) -> f64 {
        if self.reference_words == 0 {
            0.0
        } else {
            self.errors() as f64 / self.reference_words as f64
        }
    }
}

/// Align `hypothesis` against `reference` via Levenshtein dynamic
/// programming over normalized tokens, classifying each edit as a
/// substitution, insertion, or deletion.
///
/// Equal-cost backtrace paths resolve deterministically: match first, then
/// substitution, then insertion, then deletion, each tested against the
/// recorded table value.
///
/// An empty reference (after normalization) charges every hypothesis word
/// as an insertion instead of running the degenerate table.
pub fn align(reference: &str, hypothesis: &str) -> Alignment {
    let ref_tokens = normalize(reference);
    let hyp_tokens = normalize(hypothesis);
    let n = ref_tokens.len();
    let m = hyp_tokens.len();

    if n == 0 {
        return Alignment {
            substitutions: 0,
            insertions: m as u32,
            deletions: 0,
            reference_words: 0,
        };
    }

    // (N+1) x (M+1) cost table. Row 0 / column 0 are the costs of building
    // a prefix from nothing (pure insertions / deletions).
    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for (i, row) in table.iter_mut().enumerate().skip(1) {
        row[0] = i as u32;
    }
    for j in 1..=m {
        table[0][j] = j as u32;
    }

    for i in 1..=n {
        for j in 1..=m {
            table[i][j] = if ref_tokens[i - 1] == hyp_tokens[j - 1] {
                table[i - 1][j - 1]
            } else {
                let substitution = table[i - 1][j - 1];
                let insertion = table[i][j - 1];
                let deletion = table[i - 1][j];
                1 + substitution.min(insertion).min(deletion)
            };
        }
    }

    backtrace(&table, &ref_tokens, &hyp_tokens)
}

fn backtrace(table: &[Vec<u32>], ref_tokens: &[String], hyp_tokens: &[String]) -> Alignment {
    let mut i = ref_tokens.len();
    let mut j = hyp_tokens.len();
    let mut substitutions = 0;
    let mut insertions = 0;
    let mut deletions = 0;

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && ref_tokens[i - 1] == hyp_tokens[j - 1] {
            i -= 1;
            j -= 1;
        } else if i > 0 && j > 0 && table[i][j] == table[i - 1][j - 1] + 1 {
            substitutions += 1;
            i -= 1;
            j -= 1;
        } else if j > 0 && table[i][j] == table[i][j - 1] + 1 {
            insertions += 1;
            j -= 1;
        } else if i > 0 && table[i][j] == table[i - 1][j] + 1 {
            deletions += 1;
            i -= 1;
        } else if i > 0 {
            // Boundary: only deletions remain.
            deletions += 1;
            i -= 1;
        } else {
            insertions += 1;
            j -= 1;
        }
    }

    Alignment {
        substitutions,
        insertions,
        deletions,
        reference_words: ref_tokens.len() as u32,
    }
}
