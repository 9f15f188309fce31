//! Comment normalization for view SQL
//!
//! Catalog exports contain `//` line comments and block comments spread over
//! several lines. The SQL parser only needs to see `--` comments, so every
//! comment is rewritten into one `-- ` line per commented line. Each line is
//! trimmed on the way.

/// Rewrite every comment of `sql` into `-- ` line comments.
pub fn normalize_comments(sql: &str) -> String {
    let mut lines = Vec::new();
    let mut in_block = false;

    for line in sql.lines() {
        let mut rest = line.trim();

        if !in_block {
            if let Some(comment) = rest.strip_prefix("//").or_else(|| rest.strip_prefix("--")) {
                lines.push(line_comment(comment));
                continue;
            }
            match rest.find("/*") {
                Some(open) if !rest[..open].contains("--") => {}
                _ => {
                    lines.push(rest.replace(" //", " --"));
                    continue;
                }
            }
        }

        loop {
            if in_block {
                match rest.find("*/") {
                    Some(close) => {
                        push_comment(&mut lines, &rest[..close]);
                        rest = rest[close + 2..].trim();
                        in_block = false;
                    }
                    None => {
                        push_comment(&mut lines, rest);
                        break;
                    }
                }
            } else {
                match rest.find("/*") {
                    Some(open) => {
                        push_code(&mut lines, &rest[..open]);
                        rest = rest[open + 2..].trim();
                        in_block = true;
                    }
                    None => {
                        push_code(&mut lines, rest);
                        break;
                    }
                }
            }
            if rest.is_empty() {
                break;
            }
        }
    }

    lines.join("\n")
}

fn line_comment(text: &str) -> String {
    format!("-- {}", text.strip_prefix(' ').unwrap_or(text))
}

fn push_comment(lines: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(format!("-- {}", text));
    }
}

fn push_code(lines: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(text.to_string());
    }
}
