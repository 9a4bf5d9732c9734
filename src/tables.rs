//! Static tutoring tables: classifier keywords, suggested approaches, hint ladders,
//! analogies and filler templates.
//!
//! Everything here is immutable and built once; the classifier and the hint engine
//! receive a `&'static Tables` from `Tables::builtin()` at startup.

use std::sync::OnceLock;

use crate::domain::DomainTag;

pub struct Tables {
  pub keywords: Vec<(DomainTag, &'static [&'static str])>,
  pub approaches: Vec<(DomainTag, &'static [&'static str])>,
  pub generic_approaches: &'static [&'static str],
  pub ladders: Vec<(DomainTag, &'static [&'static str])>,
  pub generic_ladder: &'static [&'static str],
  pub analogies: Vec<(DomainTag, &'static str)>,
  pub generic_analogy: &'static str,
  pub exhaustion: &'static str,
  pub approach_followups: &'static [&'static str],
  pub question_followups: &'static [&'static str],
}

impl Tables {
  pub fn builtin() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(build_builtin)
  }

  pub fn keywords_for(&self, tag: DomainTag) -> &'static [&'static str] {
    lookup(&self.keywords, tag).unwrap_or(&[])
  }

  pub fn approaches_for(&self, tag: DomainTag) -> &'static [&'static str] {
    lookup(&self.approaches, tag).unwrap_or(self.generic_approaches)
  }

  /// Hint ladder for a tag; unknown tags fall back to the generic ladder.
  pub fn ladder_for(&self, tag: DomainTag) -> &'static [&'static str] {
    lookup(&self.ladders, tag).unwrap_or(self.generic_ladder)
  }

  pub fn analogy_for(&self, tag: DomainTag) -> &'static str {
    lookup(&self.analogies, tag).unwrap_or(self.generic_analogy)
  }
}

fn lookup<T: Copy>(table: &[(DomainTag, T)], tag: DomainTag) -> Option<T> {
  table.iter().find(|(t, _)| *t == tag).map(|(_, v)| *v)
}

const ARRAY_KEYWORDS: &[&str] = &[
  "array", "elements", "index", "iterate", "traverse", "sort",
  "search", "maximum", "minimum", "sum", "average", "largest", "smallest",
];
const MATH_KEYWORDS: &[&str] = &[
  "calculate", "compute", "formula", "equation", "multiplication",
  "division", "addition", "subtraction", "factorial", "prime", "fibonacci",
];
const STRING_KEYWORDS: &[&str] = &[
  "string", "character", "word", "text", "palindrome", "substring",
  "length", "reverse", "uppercase", "lowercase", "vowel", "consonant",
];
const LOOP_KEYWORDS: &[&str] = &[
  "repeat", "iterate", "for", "while", "loop", "times", "until",
  "sequence", "series", "pattern",
];
const CONDITIONAL_KEYWORDS: &[&str] = &[
  "if", "condition", "check", "compare", "greater", "less", "equal",
  "odd", "even", "positive", "negative", "true", "false",
];

const ARRAY_APPROACHES: &[&str] = &[
  "Iteration and tracking",
  "Two-pointer technique",
  "Divide and conquer",
  "Dynamic programming (if applicable)",
];
const MATH_APPROACHES: &[&str] = &[
  "Direct formula application",
  "Step-by-step calculation",
  "Pattern recognition",
  "Mathematical induction",
];
const STRING_APPROACHES: &[&str] = &[
  "Character-by-character processing",
  "Pattern matching",
  "String manipulation",
  "Regular expressions",
];
const LOOP_APPROACHES: &[&str] = &[
  "For loop with counter",
  "While loop with condition",
  "Nested loops for complex patterns",
  "Loop optimization",
];
const CONDITIONAL_APPROACHES: &[&str] = &[
  "If-else chains",
  "Switch statements",
  "Boolean logic",
  "Guard clauses",
];
const GENERIC_APPROACHES: &[&str] = &[
  "Break down into sub-problems",
  "Identify patterns",
  "Use appropriate data structures",
  "Consider edge cases",
];

// Ladders are questions and nudges only. Nothing here may state an answer.
const ARRAY_LADDER: &[&str] = &[
  "What information do you need to track while iterating through the array?",
  "Think about what happens when you compare each element with others.",
  "Consider using variables to store important values as you process elements.",
  "What pattern emerges when you look at successful examples step by step?",
  "How might you break this problem into smaller, manageable parts?",
];
const MATH_LADDER: &[&str] = &[
  "What mathematical relationship exists between the given numbers?",
  "Can you identify a formula or pattern that applies here?",
  "Think about the order of operations - what should be calculated first?",
  "Consider edge cases - what happens with special values?",
  "What intermediate steps might help you reach the final answer?",
];
const STRING_LADDER: &[&str] = &[
  "What properties of strings are important for this problem?",
  "Think about how you can examine each character systematically.",
  "Consider what happens when you process the string from different directions.",
  "What conditions would make this string special or meet the requirements?",
  "How can you efficiently check the characteristics you need?",
];
const LOOP_LADDER: &[&str] = &[
  "What should be your loop condition to avoid infinite loops?",
  "What variables need to be updated in each iteration?",
  "Think about your starting values - are they appropriate?",
  "What happens in the first and last iterations of your loop?",
  "Can you trace through a small example step by step?",
];
const CONDITIONAL_LADDER: &[&str] = &[
  "What are all the possible cases you need to handle?",
  "Think about the logical operators - AND, OR, NOT - which applies here?",
  "What conditions would make the result true vs false?",
  "Are there any boundary conditions that need special handling?",
  "Can you simplify complex conditions into smaller, clearer parts?",
];
const GENERIC_LADDER: &[&str] = &[
  "What is the core requirement of this problem?",
  "Can you break this problem down into smaller parts?",
  "What approach would you take if you solved this by hand?",
  "What patterns or relationships do you notice in the given examples?",
  "What edge cases or special conditions should you consider?",
];

const ARRAY_ANALOGY: &str = "Think of an array like a row of boxes, each containing something. \
You can look into each box one by one, compare contents, or remember what you've seen. \
What would you need to remember as you go from box to box?";
const MATH_ANALOGY: &str = "Mathematical problems are like cooking recipes. \
You have ingredients (input values) and need to follow steps to get your dish (result). \
What's your 'recipe' for transforming the ingredients?";
const STRING_ANALOGY: &str = "Strings are like examining a book page by page, or letter by letter. \
You might need to check spelling, count words, or find patterns. \
What are you 'reading' and what are you looking for?";
const DETECTIVE_ANALOGY: &str = "Problem-solving is like being a detective. \
You have clues (the problem description) and need to find the solution. \
What clues do you have, and what do they tell you?";

const EXHAUSTION: &str = "You've used many hints! Try to synthesize what you've learned. \
Reflect on: What patterns do you see? What approach seems most promising?";

const APPROACH_FOLLOWUPS: &[&str] = &[
  "That's a good start! What would be the first concrete step in your approach?",
  "Can you walk through your method with a simple example?",
  "Interesting! Which part of your plan are you least sure about, and why?",
];
const QUESTION_FOLLOWUPS: &[&str] = &[
  "That's a thoughtful question! Instead of giving you the answer, let me ask: What have you tried so far? What part feels unclear or challenging?",
  "Before I point anywhere, tell me: What have you tried so far, and where did it stop making sense?",
  "Good question to ask. What have you tried so far? Describe the last thing that worked and the first thing that didn't.",
];

fn build_builtin() -> Tables {
  Tables {
    keywords: vec![
      (DomainTag::Array, ARRAY_KEYWORDS),
      (DomainTag::Math, MATH_KEYWORDS),
      (DomainTag::String, STRING_KEYWORDS),
      (DomainTag::Loop, LOOP_KEYWORDS),
      (DomainTag::Conditional, CONDITIONAL_KEYWORDS),
    ],
    approaches: vec![
      (DomainTag::Array, ARRAY_APPROACHES),
      (DomainTag::Math, MATH_APPROACHES),
      (DomainTag::String, STRING_APPROACHES),
      (DomainTag::Loop, LOOP_APPROACHES),
      (DomainTag::Conditional, CONDITIONAL_APPROACHES),
    ],
    generic_approaches: GENERIC_APPROACHES,
    ladders: vec![
      (DomainTag::Array, ARRAY_LADDER),
      (DomainTag::Math, MATH_LADDER),
      (DomainTag::String, STRING_LADDER),
      (DomainTag::Loop, LOOP_LADDER),
      (DomainTag::Conditional, CONDITIONAL_LADDER),
    ],
    generic_ladder: GENERIC_LADDER,
    analogies: vec![
      (DomainTag::Array, ARRAY_ANALOGY),
      (DomainTag::Math, MATH_ANALOGY),
      (DomainTag::String, STRING_ANALOGY),
    ],
    generic_analogy: DETECTIVE_ANALOGY,
    exhaustion: EXHAUSTION,
    approach_followups: APPROACH_FOLLOWUPS,
    question_followups: QUESTION_FOLLOWUPS,
  }
}
