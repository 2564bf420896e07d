use portprobe::ports::parse_ports;
use portprobe::ScanError;

#[test]
fn parse_single_and_ranges_in_first_seen_order() {
    let ports = parse_ports("22, 80-82,443,81").expect("parse ok");
    assert_eq!(ports, vec![22, 80, 81, 82, 443, 81]);
}

#[test]
fn length_is_sum_of_token_contributions() {
    let cases = [
        ("1-100", 100),
        ("1-100,200", 101),
        ("5,5,5", 3),
        ("10-20,15-25,65535", 11 + 11 + 1),
        ("1-65535", 65535),
    ];
    for (spec, len) in cases {
        assert_eq!(parse_ports(spec).unwrap().len(), len, "{spec}");
    }
}

#[test]
fn out_of_range_and_garbage_rejected() {
    for bad in ["0", "65536", "abc", "80,abc", "1-65536", "0-10"] {
        assert!(
            matches!(parse_ports(bad), Err(ScanError::InvalidPort(_))),
            "{bad}"
        );
    }
}

#[test]
fn descending_range_rejected() {
    assert!(matches!(parse_ports("10-5"), Err(ScanError::InvalidPort(_))));
}
