use crate::error::{Result, ScanError};

/// Parse a port specifier into an ordered list of TCP ports (1..=65535).
///
/// Supported tokens, separated by commas:
/// - single port number: `80`
/// - inclusive range: `8000-8010`
///
/// Whitespace around tokens is ignored. Order of first appearance is kept and
/// overlapping tokens are not deduplicated. An empty specifier yields an empty
/// list; the caller decides what the default sequence is.
pub fn parse_ports(spec: &str) -> Result<Vec<u16>> {
    let mut out: Vec<u16> = Vec::new();
    if spec.trim().is_empty() {
        return Ok(out);
    }

    for raw in spec.split(',') {
        let token = raw.trim();
        if token.is_empty() {
            return Err(ScanError::InvalidPort(format!("empty token in '{spec}'")));
        }

        // Range `start-end`
        if let Some((a, b)) = token.split_once('-') {
            let start = parse_port_str(a.trim())?;
            let end = parse_port_str(b.trim())?;
            if start > end {
                return Err(ScanError::InvalidPort(format!(
                    "descending range {start}-{end}"
                )));
            }
            out.extend(start..=end);
            continue;
        }

        out.push(parse_port_str(token)?);
    }

    Ok(out)
}

/// Every TCP port, 1 through 65535.
pub fn all_ports() -> Vec<u16> {
    (1..=u16::MAX).collect()
}

/// A conservative list of commonly used TCP ports.
pub fn common_ports() -> Vec<u16> {
    const COMMON: &[u16] = &[
        21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 389, 443, 445, 465, 587, 631, 993, 995,
        1433, 1521, 1723, 1883, 2049, 2375, 3000, 3128, 3306, 3389, 5000, 5432, 5672, 5900, 5985,
        6379, 8000, 8008, 8080, 8081, 8443, 8888, 9000, 9092, 9200, 11211, 27017,
    ];
    COMMON.to_vec()
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s
        .parse::<u32>()
        .map_err(|_| ScanError::InvalidPort(format!("not a number: '{s}'")))?;
    if val == 0 || val > 65535 {
        return Err(ScanError::InvalidPort(format!("port out of range: {val}")));
    }
    Ok(val as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_ports() {
        let ports = parse_ports("80, 22,443 ").unwrap();
        assert_eq!(ports, vec![80, 22, 443]);
    }

    #[test]
    fn ranges_keep_order_and_duplicates() {
        let ports = parse_ports("8000-8002,80,8001").unwrap();
        assert_eq!(ports, vec![8000, 8001, 8002, 80, 8001]);
    }

    #[test]
    fn single_value_range() {
        assert_eq!(parse_ports("7-7").unwrap(), vec![7]);
    }

    #[test]
    fn empty_spec_is_empty() {
        assert!(parse_ports("").unwrap().is_empty());
        assert!(parse_ports("   ").unwrap().is_empty());
    }

    #[test]
    fn invalid_values_error() {
        for bad in ["0", "65536", "abc", "70000", "10-5", "1-2-3", "80,,443", "-5", "22-"] {
            let err = parse_ports(bad).unwrap_err();
            assert!(matches!(err, ScanError::InvalidPort(_)), "{bad}");
        }
    }

    #[test]
    fn all_ports_spans_full_range() {
        let all = all_ports();
        assert_eq!(all.len(), 65535);
        assert_eq!(all.first(), Some(&1));
        assert_eq!(all.last(), Some(&65535));
    }

    #[test]
    fn common_has_web_ports() {
        let d = common_ports();
        assert!(d.contains(&80) && d.contains(&443));
    }
}
