//! Number-systems quiz generation.
//!
//! Questions are generated server-side with the expected answer attached,
//! so the front-end can grade locally and submit the graded pairs back.
//! Question kinds line up with the answer-key evaluator slots.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tutor_core::TopicPath;

/// One generated question with its expected answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question-type tag (e.g. "dec_to_bin").
    #[serde(rename = "type")]
    pub kind: String,
    pub prompt: String,
    pub correct_answer: String,
    /// Choices for multiple-choice questions, absent for free entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl QuizQuestion {
    fn entry(kind: &str, prompt: String, answer: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            prompt,
            correct_answer: answer.into(),
            options: None,
        }
    }

    fn choice(kind: &str, prompt: &str, answer: &str, options: &[&str]) -> Self {
        Self {
            kind: kind.to_string(),
            prompt: prompt.to_string(),
            correct_answer: answer.to_string(),
            options: Some(options.iter().map(|o| (*o).to_string()).collect()),
        }
    }
}

/// Generate the question set for a nested subtopic, `None` when the path
/// has no generator.
#[must_use]
pub fn generate(path: &TopicPath, rng: &mut impl Rng) -> Option<Vec<QuizQuestion>> {
    if path.topic_id != "digital_electronics" || path.subtopic_id != "number_systems" {
        return None;
    }
    match path.nested_subtopic_id.as_str() {
        "binary" => Some(binary_quiz(rng)),
        "octal" => Some(octal_quiz(rng)),
        "hex" => Some(hex_quiz(rng)),
        "bcd" => Some(bcd_quiz(rng)),
        "gray_code" => Some(gray_code_quiz(rng)),
        _ => None,
    }
}

fn binary_quiz(rng: &mut impl Rng) -> Vec<QuizQuestion> {
    let mut questions = vec![QuizQuestion::choice(
        "definition",
        "Which digits does the binary number system use?",
        "0 and 1",
        &["0 and 1", "0 to 7", "0 to 9", "0 to 9 and A to F"],
    )];

    for _ in 0..2 {
        let n: u32 = rng.gen_range(1..=255);
        questions.push(QuizQuestion::entry(
            "dec_to_bin",
            format!("Convert decimal {n} to binary."),
            format!("{n:b}"),
        ));
    }
    for _ in 0..2 {
        let n: u32 = rng.gen_range(1..=255);
        questions.push(QuizQuestion::entry(
            "bin_to_dec",
            format!("Convert binary {n:b} to decimal."),
            n.to_string(),
        ));
    }

    questions.push(QuizQuestion::choice(
        "lsb_msb",
        "In an 8-bit binary number, which bit is the least significant bit?",
        "the rightmost bit",
        &["the rightmost bit", "the leftmost bit", "the fourth bit", "the sign bit"],
    ));
    questions.push(QuizQuestion::choice(
        "bit_groups",
        "How many bits make up a nibble?",
        "4",
        &["2", "4", "8", "16"],
    ));

    let position: u32 = rng.gen_range(0..8);
    questions.push(QuizQuestion::entry(
        "place_value",
        format!(
            "What is the place value of bit {position} (counting from 0 at the right) \
             in a binary number?"
        ),
        (1u32 << position).to_string(),
    ));

    questions
}

fn octal_quiz(rng: &mut impl Rng) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();
    for _ in 0..3 {
        let n: u32 = rng.gen_range(8..=511);
        questions.push(QuizQuestion::entry(
            "dec_to_oct",
            format!("Convert decimal {n} to octal."),
            format!("{n:o}"),
        ));
    }
    for _ in 0..3 {
        let n: u32 = rng.gen_range(8..=511);
        questions.push(QuizQuestion::entry(
            "oct_to_dec",
            format!("Convert octal {n:o} to decimal."),
            n.to_string(),
        ));
    }
    questions
}

fn hex_quiz(rng: &mut impl Rng) -> Vec<QuizQuestion> {
    let mut questions = vec![QuizQuestion::choice(
        "definition",
        "How many binary bits does a single hexadecimal digit represent?",
        "4",
        &["2", "3", "4", "8"],
    )];
    for _ in 0..2 {
        let n: u32 = rng.gen_range(16..=255);
        questions.push(QuizQuestion::entry(
            "dec_to_hex",
            format!("Convert decimal {n} to hexadecimal."),
            format!("{n:X}"),
        ));
    }
    for _ in 0..2 {
        let n: u32 = rng.gen_range(16..=255);
        questions.push(QuizQuestion::entry(
            "hex_to_dec",
            format!("Convert hexadecimal {n:X} to decimal."),
            n.to_string(),
        ));
    }
    questions
}

fn bcd_quiz(rng: &mut impl Rng) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();
    for _ in 0..3 {
        let n: u32 = rng.gen_range(10..=99);
        questions.push(QuizQuestion::entry(
            "dec_to_bcd",
            format!("Convert decimal {n} to BCD (one 4-bit group per digit)."),
            to_bcd(n),
        ));
    }
    for _ in 0..3 {
        let n: u32 = rng.gen_range(10..=99);
        questions.push(QuizQuestion::entry(
            "bcd_to_dec",
            format!("Convert BCD {} to decimal.", to_bcd(n)),
            n.to_string(),
        ));
    }
    questions
}

fn gray_code_quiz(rng: &mut impl Rng) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();
    for _ in 0..3 {
        let n: u32 = rng.gen_range(1..=31);
        questions.push(QuizQuestion::entry(
            "bin_to_gray",
            format!("Convert binary {n:b} to Gray Code."),
            format!("{:b}", to_gray(n)),
        ));
    }
    for _ in 0..3 {
        let n: u32 = rng.gen_range(1..=31);
        questions.push(QuizQuestion::entry(
            "gray_to_bin",
            format!("Convert Gray Code {:b} to binary.", to_gray(n)),
            format!("{n:b}"),
        ));
    }
    questions
}

/// Each decimal digit as its own 4-bit group.
fn to_bcd(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|c| format!("{:04b}", c.to_digit(10).unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_gray(n: u32) -> u32 {
    n ^ (n >> 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn path(nested: &str) -> TopicPath {
        TopicPath::new("digital_electronics", "number_systems", nested)
    }

    #[test]
    fn binary_quiz_covers_the_evaluator_kinds() {
        let questions = generate(&path("binary"), &mut rng()).unwrap();
        let kinds: Vec<&str> = questions.iter().map(|q| q.kind.as_str()).collect();

        for kind in ["definition", "dec_to_bin", "bin_to_dec", "lsb_msb", "bit_groups", "place_value"] {
            assert!(kinds.contains(&kind), "{kind}");
        }
        assert_eq!(kinds.iter().filter(|k| **k == "dec_to_bin").count(), 2);
    }

    #[test]
    fn generated_answers_are_consistent() {
        for nested in ["binary", "octal", "hex", "bcd", "gray_code"] {
            let questions = generate(&path(nested), &mut rng()).unwrap();
            assert!(!questions.is_empty(), "{nested}");
            for q in &questions {
                assert!(!q.correct_answer.is_empty(), "{nested}/{}", q.kind);
            }
        }
    }

    #[test]
    fn unknown_paths_have_no_generator() {
        assert!(generate(&path("ternary"), &mut rng()).is_none());
        assert!(
            generate(&TopicPath::new("math", "algebra", "binary"), &mut rng()).is_none()
        );
    }

    #[test]
    fn bcd_groups_every_digit() {
        assert_eq!(to_bcd(25), "0010 0101");
        assert_eq!(to_bcd(9), "1001");
    }

    #[test]
    fn gray_code_neighbors_differ_by_one_bit() {
        for n in 0u32..63 {
            let diff = to_gray(n) ^ to_gray(n + 1);
            assert_eq!(diff.count_ones(), 1, "{n}");
        }
    }
}
