use std::collections::HashSet;

use tfbp_explorer::correlation::{NamedColumn, build_correlation_matrix, build_from_table};
use tfbp_explorer::io::table::parse_delimited;

fn exclude_target() -> HashSet<String> {
    HashSet::from(["target".to_string()])
}

#[test]
fn scenario_perfect_linear_pair() {
    let table = parse_delimited("A,B\n1,2\n2,4\n3,6\n").unwrap();
    let payload = build_from_table(&table, &HashSet::new());
    assert_eq!(payload.labels, vec!["A", "B"]);
    assert!((payload.matrix[0][1] - 1.0).abs() < 1e-12);
    assert_eq!(payload.matrix[0][0], 1.0);
    assert_eq!(payload.matrix[1][1], 1.0);
}

#[test]
fn scenario_constant_column() {
    let table = parse_delimited("A,B\n1,1\n1,1\n1,1\n").unwrap();
    let payload = build_from_table(&table, &HashSet::new());
    assert_eq!(payload.matrix[0][1], 0.0);
    assert_eq!(payload.min, 0.0);
    assert_eq!(payload.max, 0.0);
}

#[test]
fn excludes_identifier_column_and_sorts_labels() {
    let text = "target,zeta,alpha,mid\n\
                g1,1,2,NA\n\
                g2,2,1,3\n\
                g3,3,5,1\n\
                g4,4,3,\n";
    let table = parse_delimited(text).unwrap();
    let payload = build_from_table(&table, &exclude_target());
    assert_eq!(payload.labels, vec!["alpha", "mid", "zeta"]);
    let n = payload.labels.len();
    assert_eq!(payload.matrix.len(), n);
    for i in 0..n {
        assert_eq!(payload.matrix[i].len(), n);
        assert_eq!(payload.matrix[i][i], 1.0);
        for j in 0..n {
            assert_eq!(payload.matrix[i][j], payload.matrix[j][i]);
            if i != j {
                let v = payload.matrix[i][j];
                assert!((-1.0..=1.0).contains(&v));
                assert!(payload.min <= v && v <= payload.max);
            }
        }
    }
}

#[test]
fn column_permutation_gives_identical_payload() {
    let a = "target,B,A,C\ng1,1,4,2\ng2,5,2,2\ng3,2,8,7\ng4,9,1,3\n";
    let b = "C,target,A,B\n2,g1,4,1\n2,g2,2,5\n7,g3,8,2\n3,g4,1,9\n";
    let pa = build_from_table(&parse_delimited(a).unwrap(), &exclude_target());
    let pb = build_from_table(&parse_delimited(b).unwrap(), &exclude_target());
    assert_eq!(pa, pb);
    assert_eq!(
        serde_json::to_string(&pa).unwrap(),
        serde_json::to_string(&pb).unwrap()
    );
}

#[test]
fn fewer_than_two_labels_defaults_extrema() {
    let single = build_correlation_matrix(&[NamedColumn {
        name: "only".to_string(),
        values: vec![Some(1.0), Some(2.0)],
    }]);
    assert_eq!(single.matrix, vec![vec![1.0]]);
    assert_eq!((single.min, single.max), (0.0, 1.0));

    let empty = build_correlation_matrix(&[]);
    assert!(empty.labels.is_empty());
    assert!(empty.matrix.is_empty());
    assert_eq!((empty.min, empty.max), (0.0, 1.0));
}

#[test]
fn tab_delimited_input_is_sniffed() {
    let table = parse_delimited("target\tX\tY\ng1\t1\t3\ng2\t2\t2\ng3\t3\t1\n").unwrap();
    let payload = build_from_table(&table, &exclude_target());
    assert_eq!(payload.labels, vec!["X", "Y"]);
    assert!((payload.matrix[0][1] + 1.0).abs() < 1e-12);
    assert!((payload.min + 1.0).abs() < 1e-12);
}
