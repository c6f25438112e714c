//! Disassembler: image → one instruction per line.
//!
//! The image is swept linearly from address 0. Inline data (variable
//! cells, reserved blocks) is decoded like code, so a data Word that
//! happens to be a valid opcode shows up as an instruction.

use stackvm_common::{Image, Opcode, Word};

/// Disassemble an image.
///
/// Each line is `ADDR: MNEMONIC operands`. Words that are not opcodes, and
/// opcodes whose operands run past the end of the image, print as
/// `.word N`. WRITE_STR prints its inline text as a quoted literal.
pub fn disassemble(image: &Image) -> String {
    let words = &image.words;
    let mut lines = Vec::new();
    let mut addr = 0;

    while addr < words.len() {
        let (text, width) = decode_at(words, addr);
        lines.push(format!("{addr:04}: {text}"));
        addr += width;
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Decode the instruction at `addr`. Returns its text and Word count.
fn decode_at(words: &[Word], addr: usize) -> (String, usize) {
    let word = words[addr];
    let raw = (format!(".word {word}"), 1);

    let Ok(op) = Opcode::try_from(word) else {
        return raw;
    };

    match op.inline_operands() {
        Some(0) => (op.mnemonic().to_string(), 1),
        Some(n) => match words.get(addr + 1..addr + 1 + n) {
            Some(operands) => {
                let args: Vec<String> = operands.iter().map(Word::to_string).collect();
                (format!("{} {}", op.mnemonic(), args.join(" ")), 1 + n)
            }
            None => raw,
        },
        None => match decode_string(words, addr + 1) {
            Some((text, len)) => (format!("{} {text:?}", op.mnemonic()), 2 + len),
            None => raw,
        },
    }
}

/// Decode a WRITE_STR payload starting at its length Word.
fn decode_string(words: &[Word], at: usize) -> Option<(String, usize)> {
    let len = usize::try_from(*words.get(at)?).ok()?;
    let codes = words.get(at + 1..at + 1 + len)?;
    let text = codes
        .iter()
        .map(|&code| {
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect();
    Some((text, len))
}
