use logminer::{ChangeType, Drain, DrainConfig, SearchStrategy};

const SSHD_LINES: [&str; 6] = [
    "Dec 10 07:07:38 LabSZ sshd[24206]: input_userauth_request: invalid user test9 [preauth]",
    "Dec 10 07:08:28 LabSZ sshd[24208]: input_userauth_request: invalid user webmaster [preauth]",
    "Dec 10 09:12:32 LabSZ sshd[24490]: Failed password for invalid user ftpuser from 0.0.0.0 port 62891 ssh2",
    "Dec 10 09:12:35 LabSZ sshd[24492]: Failed password for invalid user pi from 0.0.0.0 port 49289 ssh2",
    "Dec 10 09:12:44 LabSZ sshd[24501]: Failed password for invalid user ftpuser from 0.0.0.0 port 60836 ssh2",
    "Dec 10 07:28:03 LabSZ sshd[24245]: input_userauth_request: invalid user pgadmin [preauth]",
];

fn templates_after_each(drain: &mut Drain, lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .map(|l| {
            let (id, _) = drain.add_message(l);
            drain.cluster(id).unwrap().template()
        })
        .collect()
}

#[test]
fn generalizes_sshd_lines() {
    let mut drain = Drain::default();
    let got = templates_after_each(&mut drain, &SSHD_LINES);
    assert_eq!(
        got,
        vec![
            "Dec 10 07:07:38 LabSZ sshd[24206]: input_userauth_request: invalid user test9 [preauth]",
            "Dec 10 [*] LabSZ [*] input_userauth_request: invalid user [*] [preauth]",
            "Dec 10 09:12:32 LabSZ sshd[24490]: Failed password for invalid user ftpuser from 0.0.0.0 port 62891 ssh2",
            "Dec 10 [*] LabSZ [*] Failed password for invalid user [*] from 0.0.0.0 port [*] ssh2",
            "Dec 10 [*] LabSZ [*] Failed password for invalid user [*] from 0.0.0.0 port [*] ssh2",
            "Dec 10 [*] LabSZ [*] input_userauth_request: invalid user [*] [preauth]",
        ]
    );
    assert_eq!(drain.cluster_count(), 2);
}

#[test]
fn stricter_similarity_keeps_lines_apart() {
    let config = DrainConfig { similarity: 0.75, ..Default::default() };
    let mut drain = Drain::new(&config);
    let got = templates_after_each(&mut drain, &SSHD_LINES);
    assert_eq!(
        got,
        vec![
            "Dec 10 07:07:38 LabSZ sshd[24206]: input_userauth_request: invalid user test9 [preauth]",
            "Dec 10 07:08:28 LabSZ sshd[24208]: input_userauth_request: invalid user webmaster [preauth]",
            "Dec 10 09:12:32 LabSZ sshd[24490]: Failed password for invalid user ftpuser from 0.0.0.0 port 62891 ssh2",
            "Dec 10 [*] LabSZ [*] Failed password for invalid user [*] from 0.0.0.0 port [*] ssh2",
            "Dec 10 [*] LabSZ [*] Failed password for invalid user [*] from 0.0.0.0 port [*] ssh2",
            "Dec 10 07:28:03 LabSZ sshd[24245]: input_userauth_request: invalid user pgadmin [preauth]",
        ]
    );
}

#[test]
fn deeper_tree_yields_same_templates() {
    let config = DrainConfig { depth: 5, ..Default::default() };
    let mut deep = Drain::new(&config);
    let mut shallow = Drain::default();
    assert_eq!(
        templates_after_each(&mut deep, &SSHD_LINES),
        templates_after_each(&mut shallow, &SSHD_LINES)
    );
}

#[test]
fn empty_messages_share_one_cluster() {
    let mut drain = Drain::default();
    let (first, change) = drain.add_message("");
    assert_eq!(change, ChangeType::NewCluster);
    for _ in 0..2 {
        let (id, change) = drain.add_message("");
        assert_eq!(id, first);
        assert_eq!(change, ChangeType::Unchanged);
    }
    assert_eq!(drain.cluster_count(), 1);
    let cluster = drain.cluster(first).unwrap();
    assert!(cluster.template_tokens.is_empty());
    assert_eq!(cluster.size(), 0);
}

#[test]
fn short_message_change_types() {
    let mut drain = Drain::default();
    assert_eq!(drain.add_message("hello").1, ChangeType::NewCluster);
    assert_eq!(drain.add_message("hello").1, ChangeType::Unchanged);
    assert_eq!(drain.add_message("otherword").1, ChangeType::NewCluster);
    assert_eq!(drain.add_message("hello   ").1, ChangeType::Unchanged);
}

#[test]
fn single_slot_store_evicts_previous_shape() {
    let config = DrainConfig { max_clusters: 1, ..Default::default() };
    let mut drain = Drain::new(&config);
    let got = templates_after_each(
        &mut drain,
        &["A format 1", "A format 2", "B format 1", "B format 2", "A format 3"],
    );
    assert_eq!(got, vec!["A format 1", "A format [*]", "B format 1", "B format [*]", "A format 3"]);
    assert_eq!(drain.cluster_count(), 1);
}

#[test]
fn lru_keeps_recently_generalized_clusters() {
    let config = DrainConfig { max_clusters: 2, ..Default::default() };
    let mut drain = Drain::new(&config);
    let got = templates_after_each(
        &mut drain,
        &["A A A", "A A B", "A B A", "A B B", "A C A", "A C B", "A B A", "A A A"],
    );
    assert_eq!(
        got,
        vec!["A A A", "A A [*]", "A B A", "A B [*]", "A C A", "A C [*]", "A B [*]", "A A A"]
    );
    let resident: Vec<String> = drain.clusters().map(|c| c.template()).collect();
    assert_eq!(resident, vec!["A C [*]", "A A A"]);
}

#[test]
fn identities_are_never_reused_after_eviction() {
    let config = DrainConfig { max_clusters: 2, ..Default::default() };
    let mut drain = Drain::new(&config);
    let ids: Vec<_> = ["one", "two words", "three word line", "four word log line"]
        .iter()
        .map(|l| drain.add_message(l).0)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(drain.cluster_counter(), 4);
    assert!(drain.cluster(1).is_none());
    assert!(drain.cluster(2).is_none());
}

#[test]
fn wildcard_positions_only_grow() {
    let mut drain = Drain::default();
    let lines = ["job 1 done in 5s", "job 2 done in 5s", "job 2 done in 7s", "job 1 done in 5s"];
    let mut previous: Vec<usize> = Vec::new();
    for line in lines {
        let (id, _) = drain.add_message(line);
        let cluster = drain.cluster(id).unwrap();
        assert_eq!(cluster.template_tokens.len(), 5);
        let wild: Vec<usize> = cluster
            .template_tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.as_str() == logminer::WILDCARD)
            .map(|(i, _)| i)
            .collect();
        assert!(previous.iter().all(|p| wild.contains(p)));
        previous = wild;
    }
    assert_eq!(previous, vec![1, 4]);
}

#[test]
fn samples_are_retained_unless_disabled() {
    let mut drain = Drain::default();
    let (id, _) = drain.add_message("disk full on sda");
    drain.add_message("disk full on sdb");
    assert_eq!(drain.cluster(id).unwrap().samples, vec!["disk full on sda", "disk full on sdb"]);

    let config = DrainConfig { retain_samples: false, ..Default::default() };
    let mut drain = Drain::new(&config);
    let (id, _) = drain.add_message("disk full on sda");
    assert!(drain.cluster(id).unwrap().samples.is_empty());
}

#[test]
fn match_is_exact_and_read_only() {
    let mut drain = Drain::default();
    drain.add_message("aa aa aa");
    drain.add_message("aa aa bb");
    drain.add_message("aa aa cc");
    drain.add_message("xx yy zz");

    assert_eq!(drain.match_message("aa aa tt", SearchStrategy::Never).map(|c| c.id), Some(1));
    assert_eq!(drain.match_message("xx yy zz", SearchStrategy::Never).map(|c| c.id), Some(2));
    assert!(drain.match_message("xx yy rr", SearchStrategy::Never).is_none());
    assert!(drain.match_message("nothing", SearchStrategy::Never).is_none());
    assert_eq!(drain.cluster(2).unwrap().template(), "xx yy zz");
    assert_eq!(drain.cluster_count(), 2);
}

#[test]
fn match_after_add_returns_same_cluster() {
    let mut drain = Drain::default();
    for line in SSHD_LINES {
        let (id, _) = drain.add_message(line);
        let found = drain.match_message(line, SearchStrategy::Never).map(|c| c.id);
        assert_eq!(found, Some(id), "line {line:?}");
    }
}

#[test]
fn fallback_finds_clusters_the_tree_routes_elsewhere() {
    let config = DrainConfig { max_children: 2, ..Default::default() };
    let mut drain = Drain::new(&config);
    assert_eq!(drain.add_message("a x y").1, ChangeType::NewCluster);
    assert_eq!(drain.add_message("b q q").1, ChangeType::NewCluster);
    assert_eq!(drain.add_message("c q q").1, ChangeType::Updated);
    assert_eq!(drain.cluster(2).unwrap().template(), "[*] q q");

    assert!(drain.match_message("a q q", SearchStrategy::Never).is_none());
    assert_eq!(drain.match_message("a q q", SearchStrategy::Fallback).map(|c| c.id), Some(2));
    assert_eq!(drain.match_message("a q q", SearchStrategy::Always).map(|c| c.id), Some(2));
    assert_eq!(drain.match_message("a x y", SearchStrategy::Fallback).map(|c| c.id), Some(1));
    assert!(drain.match_message("a q r", SearchStrategy::Always).is_none());
}

#[test]
fn status_lists_clusters_oldest_first() {
    let mut drain = Drain::default();
    drain.add_message("disk full on sda");
    drain.add_message("user bob logged in");
    drain.add_message("disk full on sdb");
    assert_eq!(
        drain.status(),
        "cluster count 2\n\
         count 1, user bob logged in\n\n\
         \tuser bob logged in\n\n\
         count 2, disk full on [*]\n\n\
         \tdisk full on sda\n\n\
         \tdisk full on sdb\n"
    );
}

#[test]
fn status_of_empty_engine() {
    assert_eq!(Drain::default().status(), "cluster count 0\n");
}

#[test]
fn superscripts_are_not_digits_for_routing() {
    let mut drain = Drain::default();
    assert_eq!(drain.add_message("x\u{00B2} foo").1, ChangeType::NewCluster);
    assert_eq!(drain.add_message("y\u{00B2} foo").1, ChangeType::NewCluster);
    let keys: Vec<&str> = drain
        .tree()
        .length_node(2)
        .unwrap()
        .children()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["x\u{00B2}", "y\u{00B2}"]);
}

#[test]
fn decimal_digits_in_any_script_share_the_wildcard() {
    let mut drain = Drain::default();
    drain.add_message("\u{0661}\u{0662} foo");
    assert_eq!(drain.add_message("\u{0663} foo").1, ChangeType::Updated);
    assert_eq!(drain.cluster(1).unwrap().template(), "[*] foo");
}
