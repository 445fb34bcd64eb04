// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with some [[Linked Page]] content.\n\n| Key | Value |\n|-----|-------|\n| a   | 1     |\n| b   | 2     |\n\n$$\n\\sum_{i=0}^n i\n$$\n\n```mermaid\ngraph TD\n    A --> B\n```\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_prose(paragraphs: usize) -> String {
    let mut content = String::new();
    for i in 0..paragraphs {
        content.push_str(&format!(
            "Paragraph {i} has a few sentences. None of them open a region.\nA second line keeps the paragraph going.\n\n"
        ));
    }
    content
}

#[allow(dead_code)]
pub fn generate_large_document() -> String {
    let mut content = generate_markdown_content(200);
    content.push_str(&generate_prose(500));
    content
}
