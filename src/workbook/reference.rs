//! Excel-style cell reference conversions (0-based indexes ↔ "A1" notation)

/// Converts 0-based row & column indexes to an Excel-style cell reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let row = (row + 1).to_string();
    let mut col: u32 = col as u32 + 1;
    let mut reference = String::from("");
    while col > 0 {
        col -= 1;
        let digit = char::from_u32(65 + col % 26).expect("Hardcode letters");
        col /= 26;
        reference.insert(0, digit)
    }
    reference.push_str(row.as_str());
    reference
}

/// Parses an Excel-style cell reference into 0-based (row, col) indexes.
/// Returns None for references without a letter part or a digit part.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let mut col = 0usize;
    let mut letters = 0usize;
    for character in reference.chars() {
        match character.to_ascii_uppercase() {
            letter @ 'A'..='Z' => {
                col = col * 26 + (letter as usize - 'A' as usize + 1);
                letters += 1;
            }
            _ => break,
        }
    }
    if letters == 0 {
        return None;
    }
    let row = reference[letters..].parse::<usize>().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
