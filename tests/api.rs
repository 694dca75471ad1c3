use regex_backtrack::{Config, Match, Regex};

#[test]
fn anchored_validation_pattern() {
    let re = Regex::new(r"^\d{5}$").unwrap();
    let mut cache = re.create_cache();
    assert!(re.is_match(&mut cache, "90210"));
    assert!(!re.is_match(&mut cache, "9021"));
    assert!(!re.is_match(&mut cache, "902105x"));
    assert!(!re.is_match(&mut cache, "zip 90210"));
}

#[test]
fn greedy_and_lazy_quantifiers() {
    let hay = "[Data A] some text [Data B]";

    let greedy = Regex::new(r"\[.*\]").unwrap();
    let mut cache = greedy.create_cache();
    assert_eq!(Some(Match::new(0..27)), greedy.find(&mut cache, hay));

    let lazy = Regex::new(r"\[.*?\]").unwrap();
    let mut cache = lazy.create_cache();
    assert_eq!(Some(Match::new(0..8)), lazy.find(&mut cache, hay));
}

#[test]
fn case_insensitive_flag() {
    let re = Regex::builder()
        .configure(Config::new().case_insensitive(true))
        .build("error")
        .unwrap();
    let mut cache = re.create_cache();
    assert_eq!(Some(Match::new(0..5)), re.find(&mut cache, "ERROR: oops"));
    assert_eq!(Some(Match::new(0..5)), re.find(&mut cache, "Error: oops"));
    assert_eq!(None, re.find(&mut cache, "all fine"));
}

#[test]
fn dot_matches_new_line_flag() {
    let hay = "BEGIN\nbody\nEND";
    let re = Regex::builder()
        .configure(Config::new().dot_matches_new_line(true))
        .build("BEGIN.*END")
        .unwrap();
    let mut cache = re.create_cache();
    assert_eq!(Some(Match::new(0..14)), re.find(&mut cache, hay));

    let re = Regex::new("BEGIN.*END").unwrap();
    let mut cache = re.create_cache();
    assert_eq!(None, re.find(&mut cache, hay));
}

#[test]
fn multi_line_flag() {
    let re = Regex::builder()
        .configure(Config::new().multi_line(true))
        .build(r"^\w+")
        .unwrap();
    let mut cache = re.create_cache();
    let spans: Vec<_> =
        re.find_iter(&mut cache, "foo\nbar").map(|m| m.range()).collect();
    assert_eq!(vec![0..3, 4..7], spans);

    let re = Regex::new(r"^\w+").unwrap();
    let mut cache = re.create_cache();
    let spans: Vec<_> =
        re.find_iter(&mut cache, "foo\nbar").map(|m| m.range()).collect();
    assert_eq!(vec![0..3], spans);
}

#[test]
fn matching_is_leftmost_first() {
    let re = Regex::new("sam|samwise").unwrap();
    let mut cache = re.create_cache();
    assert_eq!(Some(Match::new(0..3)), re.find(&mut cache, "samwise"));
}

#[test]
fn offsets_are_utf8_byte_offsets() {
    let re = Regex::new(r"\d+").unwrap();
    let mut cache = re.create_cache();
    let hay = "αβγ 42";
    let m = re.find(&mut cache, hay).unwrap();
    assert_eq!(7..9, m.range());
    assert_eq!("42", &hay[m.span()]);
}

#[test]
fn build_errors_render_the_offset() {
    let err = Regex::new("ab(cd").unwrap_err();
    assert_eq!(2, err.offset());
    let rendered = err.to_string();
    assert!(rendered.contains("offset 2"), "got: {}", rendered);
    assert!(rendered.contains("unclosed group"), "got: {}", rendered);

    let err = Regex::new(r"ab\q").unwrap_err();
    assert_eq!(2, err.offset());
    assert!(err.to_string().contains("\\q"), "got: {}", err);
}

#[test]
fn quantifier_without_target_is_rejected() {
    assert!(Regex::new("*a").is_err());
    assert!(Regex::new("a**").is_err());
    // A brace that does not form valid bounds is an ordinary literal.
    let re = Regex::new("a{,3}").unwrap();
    let mut cache = re.create_cache();
    assert!(re.is_match(&mut cache, "xa{,3}y"));
}
