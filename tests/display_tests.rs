//! Tests for display and formatting utilities.

use grindplan::display::{describe_goal, format_count};
use grindplan::models::MinGains;

#[test]
fn test_format_count_whole_numbers() {
    assert_eq!(format_count(0.0), "0");
    assert_eq!(format_count(10.0), "10");
    assert_eq!(format_count(100.0), "100");
}

#[test]
fn test_format_count_fractions() {
    assert_eq!(format_count(2.5), "2.5");
    assert_eq!(format_count(1.25), "1.25");
    assert_eq!(format_count(1234.5678), "1234.568");
    assert_eq!(format_count(2.0 / 3.0), "0.667");
}

#[test]
fn test_format_count_negative() {
    assert_eq!(format_count(-2.5), "-2.5");
    // tiny negative solver noise should not print as "-0"
    assert_eq!(format_count(-0.0001), "0");
}

#[test]
fn test_describe_goal() {
    let goal = MinGains::single("Penny", 25.0).with_target("Rostygold", -5.0);
    assert_eq!(describe_goal(&goal), "25 x Penny");

    let goal = MinGains::single("Penny", 2.5).with_target("Jade Fragment", 10.0);
    assert_eq!(describe_goal(&goal), "10 x Jade Fragment, 2.5 x Penny");
}

#[test]
fn test_describe_empty_goal() {
    let mut goal = MinGains::new();
    goal.release("Card: Secrets and Spending");

    assert_eq!(describe_goal(&goal), "nothing");
}
