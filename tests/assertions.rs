use regex_backtrack::{Match, Regex};

#[test]
fn word_boundaries() {
    let re = Regex::new(r"\bcat\b").unwrap();
    let mut cache = re.create_cache();
    assert_eq!(Some(Match::new(4..7)), re.find(&mut cache, "the cat sat"));
    assert_eq!(None, re.find(&mut cache, "concatenate"));

    let re = Regex::new(r"\Bcat").unwrap();
    let mut cache = re.create_cache();
    assert_eq!(Some(Match::new(3..6)), re.find(&mut cache, "concat"));
    assert_eq!(None, re.find(&mut cache, "cat nap"));
}

#[test]
fn anchors_bind_to_haystack_ends() {
    let re = Regex::new("end$").unwrap();
    let mut cache = re.create_cache();
    assert_eq!(Some(Match::new(4..7)), re.find(&mut cache, "the end"));
    assert_eq!(None, re.find(&mut cache, "the ending"));

    let re = Regex::new("^the").unwrap();
    let mut cache = re.create_cache();
    assert!(re.is_match(&mut cache, "the end"));
    assert!(!re.is_match(&mut cache, "at the end"));
}

#[test]
fn lookahead_as_precondition() {
    // At least one digit, then the whole thing is word chars.
    let re = Regex::new(r"^(?=.*\d)\w+$").unwrap();
    let mut cache = re.create_cache();
    assert!(re.is_match(&mut cache, "abc123"));
    assert!(re.is_match(&mut cache, "1abcdef"));
    assert!(!re.is_match(&mut cache, "abcdef"));
    assert!(!re.is_match(&mut cache, "abc 123"));
}

#[test]
fn negative_lookahead_filters_matches() {
    let re = Regex::new(r"\bfoo(?!bar)\w*").unwrap();
    let mut cache = re.create_cache();
    let hay = "foobar foobaz";
    let spans: Vec<_> =
        re.find_iter(&mut cache, hay).map(|m| m.range()).collect();
    assert_eq!(vec![7..13], spans);
}

#[test]
fn lookbehind_sees_text_before_the_span() {
    let re = Regex::new(r"(?<=\$)\d+").unwrap();
    let mut cache = re.create_cache();
    let mut caps = re.create_captures();

    let hay = "$100";
    // Even when the span excludes the '$', the look-behind can see it.
    let input = regex_backtrack::Input::new(hay).span(1..hay.len());
    re.try_search(&mut cache, &input, &mut caps).unwrap();
    assert_eq!(Some(1..4), caps.get_match().map(|m| m.range()));
}

#[test]
fn variable_width_lookbehind() {
    let re = Regex::new(r"(?<=\d{2,3}-)x").unwrap();
    let mut cache = re.create_cache();
    assert!(re.is_match(&mut cache, "12-x"));
    assert!(re.is_match(&mut cache, "123-x"));
    assert!(!re.is_match(&mut cache, "1-x"));
}

#[test]
fn assertions_are_zero_width_in_iteration() {
    let re = Regex::new(r"\b").unwrap();
    let mut cache = re.create_cache();
    let spans: Vec<_> =
        re.find_iter(&mut cache, "hi yo").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 2..2, 3..3, 5..5], spans);
}
