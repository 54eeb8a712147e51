use std::collections::HashSet;

fn flip_bit(number: &str, bit: usize) -> String {
    number
        .char_indices()
        .map(|(i, c)| match (i == bit, c) {
            (true, '0') => '1',
            (true, _) => '0',
            (false, c) => c,
        })
        .collect()
}

/// All `2^bits` binary strings of width `bits`, starting at all zeros, where each entry differs
/// from the previous one in exactly one bit. The next entry always flips the lowest bit that
/// leads somewhere new.
pub fn gray_code(bits: usize) -> Vec<String> {
    let total = 1usize << bits;
    let mut steps = Vec::with_capacity(total);
    let mut seen = HashSet::with_capacity(total);

    let start = "0".repeat(bits);
    seen.insert(start.clone());
    steps.push(start);

    while steps.len() < total {
        let current = &steps[steps.len() - 1];
        let next = (0..bits)
            .map(|bit| flip_bit(current, bit))
            .find(|candidate| !seen.contains(candidate));

        match next {
            Some(next) => {
                seen.insert(next.clone());
                steps.push(next);
            }
            None => break,
        }
    }

    steps
}
