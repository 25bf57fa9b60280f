//! Tolerant parser for the textual dump format.
//!
//! ```text
//! goroutine 18 [chan receive, 2 minutes]:
//! main.worker(0xc000010000)
//!         /app/worker.go:41 +0x6e
//! created by main.main in goroutine 1
//!         /app/main.go:12 +0x2a
//! ```
//!
//! Blocks are separated by blank lines. The first line of a block is the
//! header; every following line is a stack frame, where an indented line is
//! the location half of the frame above it.

use std::collections::HashMap;

use super::ExecutionUnitRecord;

/// Result of parsing one dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDump {
    /// Valid records in dump order (a repeated id keeps its last block).
    pub records: Vec<ExecutionUnitRecord>,
    /// Number of blocks dropped because of a malformed header.
    pub defects: usize,
}

/// Parses a raw dump. Never fails; malformed blocks are counted and skipped.
pub fn parse_dump(text: &str) -> ParsedDump {
    let mut parsed = ParsedDump::default();
    let mut index_by_id: HashMap<u64, usize> = HashMap::new();

    for block in split_blocks(text) {
        let Some((header, frame_lines)) = block.split_first() else {
            continue;
        };
        let Some((id, state)) = parse_header(header) else {
            parsed.defects += 1;
            continue;
        };

        let record = ExecutionUnitRecord {
            id,
            state,
            frames: collapse_frames(frame_lines),
        };
        match index_by_id.get(&id) {
            Some(&idx) => parsed.records[idx] = record,
            None => {
                index_by_id.insert(id, parsed.records.len());
                parsed.records.push(record);
            }
        }
    }

    parsed
}

/// Splits text into blocks of non-blank lines.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Parses `<keyword> <id> [<state>]:`, returning id and trimmed state.
///
/// Tokens between the id and the opening bracket are ignored.
fn parse_header(line: &str) -> Option<(u64, String)> {
    let body = line.trim_end().strip_suffix(':')?;

    let (keyword, rest) = body.split_once(char::is_whitespace)?;
    if keyword.is_empty() {
        return None;
    }

    let (id_str, rest) = rest.trim_start().split_once(char::is_whitespace)?;
    let id = id_str.parse::<u64>().ok()?;

    let open = rest.find('[')?;
    let state = rest[open + 1..].trim_end().strip_suffix(']')?.trim();
    if state.is_empty() {
        return None;
    }

    Some((id, state.to_string()))
}

/// Joins each indented location line onto the frame line above it.
fn collapse_frames(lines: &[&str]) -> Vec<String> {
    let mut frames: Vec<String> = Vec::with_capacity(lines.len());

    for line in lines {
        let is_location = line.starts_with(char::is_whitespace);
        let text = line.trim();
        match frames.last_mut() {
            Some(prev) if is_location => {
                prev.push(' ');
                prev.push_str(text);
            }
            _ => frames.push(text.to_string()),
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_variants() {
        assert_eq!(
            parse_header("goroutine 18 [chan receive, 2 minutes]:"),
            Some((18, "chan receive, 2 minutes".to_string()))
        );
        assert_eq!(
            parse_header("thread 3 [idle]:  "),
            Some((3, "idle".to_string()))
        );
        // Extra tokens before the bracket are tolerated.
        assert_eq!(
            parse_header("goroutine 1 gp=0xc000002380 m=0 [running]:"),
            Some((1, "running".to_string()))
        );
    }

    #[test]
    fn test_parse_header_rejects_malformed() {
        assert_eq!(parse_header("goroutine abc [running]:"), None);
        assert_eq!(parse_header("goroutine 5 []:"), None);
        assert_eq!(parse_header("goroutine 5 [running]"), None);
        assert_eq!(parse_header("goroutine 5 running:"), None);
        assert_eq!(parse_header("goroutine [running]:"), None);
        assert_eq!(parse_header("   goroutine 5 [running]:"), None);
        assert_eq!(parse_header("goroutine -5 [running]:"), None);
    }

    #[test]
    fn test_parse_well_formed_dump() {
        let dump = "goroutine 1 [running]:\n\
                    main.main()\n\
                    \t/app/main.go:10 +0x20\n\
                    \n\
                    goroutine 18 [chan receive]:\n\
                    main.worker(0xc000010000)\n\
                    \t/app/worker.go:41 +0x6e\n\
                    created by main.main in goroutine 1\n\
                    \t/app/main.go:12 +0x2a\n";

        let parsed = parse_dump(dump);
        assert_eq!(parsed.defects, 0);
        assert_eq!(parsed.records.len(), 2);

        let worker = &parsed.records[1];
        assert_eq!(worker.id, 18);
        assert_eq!(worker.state, "chan receive");
        assert_eq!(
            worker.frames,
            vec![
                "main.worker(0xc000010000) /app/worker.go:41 +0x6e".to_string(),
                "created by main.main in goroutine 1 /app/main.go:12 +0x2a".to_string(),
            ]
        );
        assert_eq!(worker.description(), "main.worker(0xc000010000) /app/worker.go:41 +0x6e");
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let dump = "goroutine 1 [running]:\nmain.main()\n\n\
                    this is not a header\nframe\n\n\
                    goroutine 2 [sleep]:\ntime.Sleep()\n";

        let parsed = parse_dump(dump);
        assert_eq!(parsed.defects, 1);
        let ids: Vec<u64> = parsed.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_header_only_block_has_empty_trace() {
        let parsed = parse_dump("goroutine 9 [idle]:\n\ngoroutine 10 [idle]:\nf()\n");
        assert_eq!(parsed.records.len(), 2);
        assert!(parsed.records[0].frames.is_empty());
        assert_eq!(parsed.records[1].frames, vec!["f()".to_string()]);
    }

    #[test]
    fn test_crlf_and_whitespace_only_separators() {
        let dump = "goroutine 1 [running]:\r\nmain.main()\r\n   \r\ngoroutine 2 [select]:\r\nf()\r\n";
        let parsed = parse_dump(dump);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].frames, vec!["main.main()".to_string()]);
        assert_eq!(parsed.records[1].state, "select");
    }

    #[test]
    fn test_duplicate_id_keeps_last_block() {
        let parsed = parse_dump("goroutine 4 [running]:\na()\n\ngoroutine 4 [sleep]:\nb()\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].state, "sleep");
        assert_eq!(parsed.records[0].frames, vec!["b()".to_string()]);
    }

    #[test]
    fn test_leading_location_line_is_its_own_frame() {
        let frames = collapse_frames(&["\t/app/orphan.go:1", "f()", "\t/app/f.go:2"]);
        assert_eq!(
            frames,
            vec!["/app/orphan.go:1".to_string(), "f() /app/f.go:2".to_string()]
        );
    }

    #[test]
    fn test_empty_dump() {
        assert_eq!(parse_dump(""), ParsedDump::default());
        assert_eq!(parse_dump("\n\n  \n"), ParsedDump::default());
    }
}
