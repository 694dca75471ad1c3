use regex_backtrack::Regex;

#[test]
fn find_iter_words() {
    let re = Regex::new(r"\w+").unwrap();
    let mut cache = re.create_cache();
    let hay = "pick three, any three";
    let words: Vec<_> =
        re.find_iter(&mut cache, hay).map(|m| &hay[m.span()]).collect();
    assert_eq!(vec!["pick", "three", "any", "three"], words);
}

#[test]
fn captures_iter_key_value_pairs() {
    let re = Regex::new(r"(\w+)=(\w+)").unwrap();
    let mut cache = re.create_cache();
    let hay = "host=local port=8080";
    let pairs: Vec<_> = re
        .captures_iter(&mut cache, hay)
        .map(|caps| {
            (
                &hay[caps.get_group(1).unwrap()],
                &hay[caps.get_group(2).unwrap()],
            )
        })
        .collect();
    assert_eq!(vec![("host", "local"), ("port", "8080")], pairs);
}

#[test]
fn empty_pattern_yields_every_position() {
    let re = Regex::new("").unwrap();
    let mut cache = re.create_cache();
    let spans: Vec<_> =
        re.find_iter(&mut cache, "ab").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 1..1, 2..2], spans);
}

#[test]
fn empty_matches_advance_by_whole_chars() {
    let re = Regex::new("").unwrap();
    let mut cache = re.create_cache();
    // Two-byte chars; no offset inside one may be reported.
    let spans: Vec<_> =
        re.find_iter(&mut cache, "αβ").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 2..2, 4..4], spans);
}

#[test]
fn empty_match_after_real_match_is_skipped() {
    let re = Regex::new("a*").unwrap();
    let mut cache = re.create_cache();
    let spans: Vec<_> =
        re.find_iter(&mut cache, "aaxaa").map(|m| m.range()).collect();
    assert_eq!(vec![0..2, 3..5], spans);
}

#[test]
fn iteration_does_not_overlap_matches() {
    let re = Regex::new("aa").unwrap();
    let mut cache = re.create_cache();
    let spans: Vec<_> =
        re.find_iter(&mut cache, "aaaa").map(|m| m.range()).collect();
    assert_eq!(vec![0..2, 2..4], spans);
}

#[test]
fn iterators_are_resumable_state_machines() {
    let re = Regex::new(r"\d").unwrap();
    let mut cache = re.create_cache();
    let mut it = re.find_iter(&mut cache, "1a2b3");
    assert_eq!(Some(0..1), it.next().map(|m| m.range()));
    assert_eq!(Some(2..3), it.next().map(|m| m.range()));
    assert_eq!(Some(4..5), it.next().map(|m| m.range()));
    assert_eq!(None, it.next());
    assert_eq!(None, it.next());
}
