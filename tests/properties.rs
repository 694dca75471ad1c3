use regex_backtrack::{Config, Regex};

/// Map arbitrary bytes to an ASCII haystack. The interesting offsets and
/// case behavior all show up without leaving ASCII, and properties about
/// case folding stay meaningful.
fn ascii(bytes: Vec<u8>) -> String {
    bytes.into_iter().map(|b| char::from(b % 0x80)).collect()
}

quickcheck::quickcheck! {
    fn is_match_agrees_with_find(bytes: Vec<u8>) -> bool {
        let hay = ascii(bytes);
        let re = Regex::new("[ab]+c?").unwrap();
        let mut cache = re.create_cache();
        re.is_match(&mut cache, &hay)
            == re.find(&mut cache, &hay).is_some()
    }

    fn find_agrees_with_an_anchored_rerun(bytes: Vec<u8>) -> bool {
        let hay = ascii(bytes);
        let re = Regex::new("[ab]+").unwrap();
        let mut cache = re.create_cache();
        match re.find(&mut cache, &hay) {
            None => true,
            Some(m) => {
                re.try_match_at(&mut cache, &hay, m.start()).unwrap()
                    == Some(m)
            }
        }
    }

    fn iter_spans_are_ordered_and_disjoint(bytes: Vec<u8>) -> bool {
        let hay = ascii(bytes);
        let re = Regex::new(r"\w+").unwrap();
        let mut cache = re.create_cache();
        let mut prev_end = 0;
        for m in re.find_iter(&mut cache, &hay) {
            let ok = m.start() >= prev_end
                && m.end() <= hay.len()
                && hay.is_char_boundary(m.start())
                && hay.is_char_boundary(m.end());
            if !ok {
                return false;
            }
            prev_end = m.end();
        }
        true
    }

    fn case_insensitive_search_ignores_ascii_case(bytes: Vec<u8>) -> bool {
        let hay = ascii(bytes);
        let re = Regex::builder()
            .configure(Config::new().case_insensitive(true))
            .build("[a-z]{2}")
            .unwrap();
        let mut cache = re.create_cache();
        let upper = hay.to_ascii_uppercase();
        re.is_match(&mut cache, &hay) == re.is_match(&mut cache, &upper)
    }

    fn empty_capable_iteration_terminates(bytes: Vec<u8>) -> bool {
        let hay = ascii(bytes);
        let re = Regex::new("x*").unwrap();
        let mut cache = re.create_cache();
        let count = re.find_iter(&mut cache, &hay).count();
        // At most one match per position, and the iterator must finish.
        count <= hay.chars().count() + 1
    }
}
