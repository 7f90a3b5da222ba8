//! Console report for one analyzed data set.

use std::fmt::Write;

use sl_core::{NetworkGraph, SyncResult, SyncState};

/// Data sets smaller than this that still classify as highly symmetric are
/// flagged as likely artifacts.
pub const MIN_INTERACTIONS: usize = 15;
/// Category id at or above which a geometry counts as highly symmetric.
pub const HIGH_SYMMETRY_ID: u8 = 17;
/// Span in days under which a data set counts as short.
pub const SHORT_SPAN_DAYS: f64 = 60.0;

const WIDTH: usize = 50;

fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, WIDTH).collect()
}

/// True when a high-symmetry result rests on too little data to trust.
pub fn is_artifact(result: &SyncResult, total_events: usize, span_days: f64) -> bool {
    total_events < MIN_INTERACTIONS
        && result.category_id() >= HIGH_SYMMETRY_ID
        && span_days < SHORT_SPAN_DAYS
}

pub fn banner(name: &str) -> String {
    format!("{eq}\nRUNNING: {name}\n{eq}\n", eq = rule('='))
}

/// Render the topology summary and one block per analyzed pair.
pub fn render(net: &NetworkGraph, results: &[SyncResult], span_days: f64) -> String {
    let mut out = String::new();
    let metrics = net.metrics();
    let _ = writeln!(
        out,
        "[mode] {span_days:.1} days active, length tolerance {:.2}",
        net.config().classifier.length_tolerance
    );
    let _ = writeln!(out, "\nNETWORK TOPOLOGY REPORT\n{}", rule('='));
    let _ = writeln!(out, "Nodes:            {}", metrics.total_agents);
    let _ = writeln!(out, "Edges (Pairs):    {}", metrics.total_pairs);
    let _ = writeln!(out, "Sync Rate:        {:.1}%", metrics.synchronization_rate * 100.0);
    let _ = writeln!(out, "Network Density:  {:.1}%", metrics.network_density * 100.0);
    let _ = writeln!(out, "Clusters:         {}", metrics.cluster_count);
    for cluster in net.clusters() {
        let _ = writeln!(
            out,
            "  [{}] avg {:.3} over {} pairs",
            cluster.agents.join(", "),
            cluster.avg_sync_score,
            cluster.pair_count
        );
    }

    for result in results {
        render_pair(&mut out, net, result, span_days);
    }
    out
}

fn render_pair(out: &mut String, net: &NetworkGraph, result: &SyncResult, span_days: f64) {
    let (a, b) = (&result.agents.0, &result.agents.1);
    let _ = writeln!(out, "\n{dash}\nCONNECTION: {a} ↔ {b}\n{dash}", dash = rule('-'));

    if result.state == SyncState::InsufficientData {
        let _ = writeln!(out, "STATUS: INSUFFICIENT DATA");
        return;
    }
    let (Some(compat), Some(fp_a), Some(fp_b)) = (
        net.compare_fingerprints(a, b),
        net.profile(a),
        net.profile(b),
    ) else {
        tracing::warn!("could not calculate fingerprints for {a} ↔ {b}");
        return;
    };

    let _ = writeln!(out, "PRE-SYNC STATUS:");
    let _ = writeln!(out, "  Sync Likelihood:  {:.1}%", compat.potential_sync * 100.0);
    let _ = writeln!(out, "  Balance:          {:.1}%", compat.balance * 100.0);
    let status = if compat.verified { "VERIFIED" } else { "UNVERIFIED" };
    let _ = writeln!(out, "  Status:           {status}");

    let _ = writeln!(out, "\nAGENT FINGERPRINTS:");
    for fp in [&fp_a, &fp_b] {
        let _ = writeln!(
            out,
            "  {}: [Rx: {:.1}° | Tx: {:.1}°]",
            fp.id, fp.receptivity, fp.assertiveness
        );
    }

    let _ = writeln!(out, "\nANALYSIS:");
    let _ = writeln!(out, "  PHASE STATE:      [ {} ] ({})", result.state, result.percent());
    let _ = writeln!(
        out,
        "  PATTERN:          {} (ID: {})",
        result.category_name(),
        result.category_id()
    );
    let _ = writeln!(out, "  SYNC SCORE:       {:.3}", result.score);

    if let Some(time) = &result.subjective_time {
        let _ = writeln!(out, "\nSUBJECTIVE TIME:");
        let _ = writeln!(out, "  Time Effect:      {:.3}x", time.time_effect);
        let _ = writeln!(out, "  Subjective Hour:  {}", time.description());
    }
    if let Some(fingerprint) = &result.fingerprint {
        let _ = writeln!(out, "  Fingerprint:      {fingerprint}");
    }
    if is_artifact(result, net.events().len(), span_days) {
        let _ = writeln!(out, "WARNING: Artifact detected (High Symmetry / Low Volume)");
    }
}
