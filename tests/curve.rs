use tfbp_explorer::io::table::parse_delimited;
use tfbp_explorer::math::binomial::Binomial;
use tfbp_explorer::rank_response::{RankObservation, build_curve, observations_from_table};

fn obs(rank_bin: i64, responsive: bool, random: Option<f64>) -> RankObservation {
    RankObservation {
        rank_bin,
        responsive,
        random,
    }
}

#[test]
fn scenario_cumulative_fraction() {
    let input: Vec<RankObservation> = (1..=5)
        .map(|bin| obs(bin, [1, 3, 5].contains(&bin), if bin == 1 { Some(0.2) } else { Some(0.9) }))
        .collect();
    let mut b = Binomial::new();
    let plot = build_curve(&input, 150, &mut b).unwrap();
    assert_eq!(plot.x, vec![1, 2, 3, 4, 5]);
    let expected = [1.0, 0.5, 2.0 / 3.0, 0.5, 0.6];
    for (got, want) in plot.y.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-9);
    }
    assert_eq!(plot.random, vec![0.2; 5]);
}

#[test]
fn curve_invariants_hold() {
    let input: Vec<RankObservation> = (1..=60)
        .map(|bin| obs(bin, bin % 3 == 0 || bin < 4, Some(0.15)))
        .collect();
    let mut b = Binomial::new();
    let plot = build_curve(&input, 150, &mut b).unwrap();
    let n = plot.len();
    assert_eq!(plot.y.len(), n);
    assert_eq!(plot.random.len(), n);
    assert_eq!(plot.ci_lower.len(), n);
    assert_eq!(plot.ci_upper.len(), n);
    let mut prev_successes = 0.0;
    for i in 0..n {
        assert!((0.0..=1.0).contains(&plot.y[i]));
        let successes = plot.y[i] * plot.x[i] as f64;
        assert!(successes + 1e-9 >= prev_successes);
        prev_successes = successes;
        assert!(plot.ci_lower[i] <= plot.random[i]);
        assert!(plot.random[i] <= plot.ci_upper[i]);
        if i > 0 {
            assert!(plot.x[i] > plot.x[i - 1]);
        }
    }
}

#[test]
fn bins_outside_range_are_dropped() {
    let input = vec![
        obs(0, true, Some(0.5)),
        obs(-3, true, Some(0.5)),
        obs(2, true, Some(0.3)),
        obs(151, true, Some(0.5)),
    ];
    let mut b = Binomial::new();
    let plot = build_curve(&input, 150, &mut b).unwrap();
    assert_eq!(plot.x, vec![2]);
    assert_eq!(plot.y, vec![0.5]);
    assert_eq!(plot.random, vec![0.3]);
}

#[test]
fn empty_input_has_no_curve() {
    let mut b = Binomial::new();
    assert!(build_curve(&[], 150, &mut b).is_none());
    assert!(build_curve(&[obs(200, true, None)], 150, &mut b).is_none());
}

#[test]
fn baseline_comes_from_first_bin_with_a_value() {
    let input = vec![obs(1, false, None), obs(2, true, Some(0.4)), obs(3, true, Some(0.7))];
    let mut b = Binomial::new();
    let plot = build_curve(&input, 150, &mut b).unwrap();
    assert_eq!(plot.random, vec![0.4, 0.4, 0.4]);
}

#[test]
fn observations_parse_from_replicate_csv() {
    let table = parse_delimited(
        "rank_bin,responsive,random\n1,True,0.1\n2,False,0.1\nNA,True,0.1\n3,1,\n4,,0.1\n",
    )
    .unwrap();
    let parsed = observations_from_table(&table).unwrap();
    assert_eq!(parsed.len(), 4);
    assert_eq!(parsed[0], obs(1, true, Some(0.1)));
    assert_eq!(parsed[2], obs(3, true, None));
    assert_eq!(parsed[3], obs(4, false, Some(0.1)));

    let missing = parse_delimited("bin,responsive\n1,True\n").unwrap();
    assert!(observations_from_table(&missing).is_err());
}
