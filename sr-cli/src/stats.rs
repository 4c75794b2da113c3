//! Statistics display and formatting

use sr_sim::{SimConfig, SimReport};

/// Format a count as a share of a total
pub fn format_ratio(part: u64, total: u64) -> String {
    if total == 0 {
        format!("{} (N/A)", part)
    } else {
        format!("{} ({:.1}%)", part, part as f64 * 100.0 / total as f64)
    }
}

/// Format simulated time in time units
pub fn format_units(units: f64) -> String {
    if units >= 1_000_000.0 {
        format!("{:.2}M", units / 1_000_000.0)
    } else if units >= 1_000.0 {
        format!("{:.2}k", units / 1_000.0)
    } else {
        format!("{:.2}", units)
    }
}

/// Payload overhead of retransmissions relative to first transmissions
pub fn retransmission_overhead(report: &SimReport) -> f64 {
    if report.sender.packets_sent == 0 {
        0.0
    } else {
        report.sender.packets_resent as f64 / report.sender.packets_sent as f64
    }
}

/// Display the parameters of a run
pub fn display_config(config: &SimConfig) {
    println!("\n┌─────────────────────────────────────────────────────────────┐");
    println!("│ SELECTIVE REPEAT EMULATOR                                   │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ Messages:      {:<44} │", config.messages);
    println!("│ Loss:          {:<44} │", config.loss_prob);
    println!("│ Corruption:    {:<44} │", config.corrupt_prob);
    println!("│ Lambda:        {:<44} │", config.lambda);
    println!("│ Window:        {:<44} │", config.window_size);
    println!("│ Timeout:       {:<44} │", config.rtt);
    println!("│ Seed:          {:<44} │", config.seed);
    println!("└─────────────────────────────────────────────────────────────┘");
}

/// Display the statistics of a finished run
pub fn display_report(report: &SimReport) {
    let status = if report.is_complete() {
        "complete"
    } else if report.completed {
        "inconsistent"
    } else {
        "time limit reached"
    };

    println!("\n┌─────────────────────────────────────────────────────────────┐");
    println!("│ RUN SUMMARY                                                 │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ Status:        {:<44} │", status);
    println!("│ End time:      {:<44} │", format_units(report.end_time.as_units()));
    println!("│ Generated:     {:<44} │", report.messages_generated);
    println!(
        "│ Accepted:      {:<44} │",
        format_ratio(report.accepted.len() as u64, report.messages_generated)
    );
    println!(
        "│ Dropped:       {:<44} │",
        format_ratio(report.messages_dropped(), report.messages_generated)
    );
    println!(
        "│ Delivered:     {:<44} │",
        format_ratio(report.delivered.len() as u64, report.accepted.len() as u64)
    );
    println!("├──────────────────────────────┬──────────────────────────────┤");
    println!("│ SENDER (A)                   │ RECEIVER (B)                 │");
    println!("├──────────────────────────────┼──────────────────────────────┤");

    let sender = &report.sender;
    let receiver = &report.receiver;
    let rows = [
        (
            ("Packets sent", sender.packets_sent),
            ("Packets received", receiver.packets_received),
        ),
        (
            ("Retransmissions", sender.packets_resent),
            ("Delivered", receiver.packets_delivered),
        ),
        (
            ("Timeouts", sender.timeouts),
            ("Corrupted", receiver.corrupted_packets),
        ),
        (
            ("ACKs received", sender.acks_received),
            ("Duplicates", receiver.duplicate_packets),
        ),
        (
            ("New ACKs", sender.new_acks),
            ("Out of window", receiver.out_of_window),
        ),
        (
            ("Duplicate ACKs", sender.duplicate_acks),
            ("ACKs sent", receiver.acks_sent),
        ),
        (("Corrupted ACKs", sender.corrupted_acks), ("", 0)),
    ];
    for ((left_name, left), (right_name, right)) in rows {
        let right = if right_name.is_empty() {
            String::new()
        } else {
            right.to_string()
        };
        println!(
            "│ {:<18} {:>9} │ {:<18} {:>9} │",
            left_name, left, right_name, right
        );
    }

    println!("├──────────────────────────────┴──────────────────────────────┤");
    println!("│ CHANNEL                                                     │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ Transmitted:   {:<44} │", report.channel.transmitted);
    println!(
        "│ Lost:          {:<44} │",
        format_ratio(report.channel.lost, report.channel.transmitted)
    );
    println!(
        "│ Corrupted:     {:<44} │",
        format_ratio(report.channel.corrupted, report.channel.transmitted)
    );
    println!(
        "│ Overhead:      {:<44} │",
        format!("{:.1}%", retransmission_overhead(report) * 100.0)
    );
    if report.timer_violations > 0 {
        println!("│ Timer misuse:  {:<44} │", report.timer_violations);
    }
    println!("└─────────────────────────────────────────────────────────────┘");
}
