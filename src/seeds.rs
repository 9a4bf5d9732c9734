//! Seed data: built-in practice problems that keep the catalog useful even without
//! a TOML bank or a problems directory.

pub struct SeedProblem {
  pub id: &'static str,
  pub title: &'static str,
  pub statement: &'static str,
}

pub fn seed_problems() -> Vec<SeedProblem> {
  vec![
    SeedProblem {
      id: "p101",
      title: "Sum of Array",
      statement: "Find the sum of all elements in the array",
    },
    SeedProblem {
      id: "p102",
      title: "Largest Number in Array",
      statement: "Given an array of N integers, find the largest element.\nInput: N followed by N integers\nOutput: the largest value\nConstraints: 1 <= N <= 1000",
    },
    SeedProblem {
      id: "p103",
      title: "Count Vowels and Consonants",
      statement: "Count the vowels and consonants in a word entered by the user",
    },
    SeedProblem {
      id: "p104",
      title: "Even or Odd",
      statement: "Check whether a number is even or odd and print the result",
    },
    SeedProblem {
      id: "p105",
      title: "Digit Factorials",
      statement: "Calculate the sum of the factorials of the digits of a number, for example 145",
    },
    SeedProblem {
      id: "p106",
      title: "Multiplication Table",
      statement: "Repeat a line for each of the first 10 times of N until the table is complete",
    },
  ]
}
