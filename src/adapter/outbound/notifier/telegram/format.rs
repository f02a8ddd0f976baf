//! HTML message formatting for Telegram announcements.

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::domain::address::{address_preview, script_preview, script_to_address};
use crate::domain::amount::{format_token_amount, format_usd, format_xec, sats_to_usd};
use crate::domain::{AppAction, BlockReport, DailySummary, TokenInfo, XecSend};
use crate::port::outbound::notifier::Event;

/// Longest message Telegram accepts.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Characters shown at each end of an address preview.
const PREVIEW_CHARS: usize = 3;

/// Longest app text shown inline.
const APP_TEXT_CHARS: usize = 200;

/// Rendering options shared by every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFormat {
    /// Block explorer base URL, without trailing slash.
    pub explorer_url: String,
    pub max_xec_sends: usize,
    pub max_token_sends: usize,
}

impl Default for MessageFormat {
    fn default() -> Self {
        Self {
            explorer_url: "https://explorer.e.cash".to_string(),
            max_xec_sends: 10,
            max_token_sends: 10,
        }
    }
}

impl MessageFormat {
    fn explorer(&self) -> &str {
        self.explorer_url.trim_end_matches('/')
    }

    fn block_link(&self, hash: &str, text: &str) -> String {
        format!("<a href=\"{}/block/{hash}\">{text}</a>", self.explorer())
    }

    fn tx_link(&self, txid: &str, text: &str) -> String {
        format!("<a href=\"{}/tx/{txid}\">{text}</a>", self.explorer())
    }

    /// Address preview linked to the explorer, or a hex preview for
    /// non-standard scripts.
    fn script_link(&self, script_hex: &str) -> String {
        match script_to_address(script_hex) {
            Some(address) => format!(
                "<a href=\"{}/address/{address}\">{}</a>",
                self.explorer(),
                address_preview(&address, PREVIEW_CHARS)
            ),
            None => escape_html(&script_preview(script_hex, PREVIEW_CHARS)),
        }
    }
}

/// Render an event into the message to post.
pub fn format_event_message(event: &Event, format: &MessageFormat) -> String {
    match event {
        Event::BlockConnected(report) => block_message(report, format),
        Event::BlockFallback { height, hash } => fallback_message(*height, hash, format),
        Event::ChainReorganized { height, hash } => reorg_message(*height, hash, format),
        Event::DailySummary(day) => daily_summary_message(day),
    }
}

/// Full block announcement.
pub fn block_message(report: &BlockReport, format: &MessageFormat) -> String {
    let block = &report.summary;
    let mut msg = format!(
        "📦{} | {} | {}",
        format.block_link(&block.hash, &block.height.to_string()),
        count_label(block.num_txs as usize, "tx", "txs"),
        escape_html(&block.miner)
    );

    if let Some(reward) = &block.staking_reward {
        let _ = write!(
            msg,
            "\n💰 Staking reward: {} XEC to {}",
            format_xec(reward.sats),
            format.script_link(&reward.output_script)
        );
    }

    if let Some(prices) = &report.prices {
        let _ = write!(
            msg,
            "\n\n1 XEC = {}\n1 BTC = {}\n1 ETH = {}",
            format_usd(prices.xec_usd),
            format_usd(prices.btc_usd),
            format_usd(prices.eth_usd)
        );
    }

    if !block.geneses.is_empty() {
        let _ = write!(
            msg,
            "\n\n<b>{} created</b>",
            count_label(block.geneses.len(), "new eToken", "new eTokens")
        );
        for genesis in &block.geneses {
            msg.push('\n');
            msg.push_str(&genesis_line(
                format,
                &genesis.txid,
                &genesis.token_id,
                report.tokens.get(&genesis.token_id),
            ));
        }
    }

    if !block.app_txs.is_empty() {
        let _ = write!(
            msg,
            "\n\n<b>{}</b>",
            count_label(block.app_txs.len(), "app tx", "app txs")
        );
        for app in &block.app_txs {
            msg.push('\n');
            msg.push_str(&app_line(format, &app.txid, &app.action, report));
        }
    }

    if !block.token_sends.is_empty() {
        let _ = write!(
            msg,
            "\n\n<b>{}</b>",
            count_label(block.token_sends.len(), "eToken send tx", "eToken send txs")
        );
        for send in block.token_sends.iter().take(format.max_token_sends) {
            let amount = token_amount_label(report.tokens.get(&send.token_id), send.atoms);
            let target = match send.receiver_count {
                0 => "itself".to_string(),
                1 => "1 address".to_string(),
                n => format!("{n} addresses"),
            };
            let _ = write!(
                msg,
                "\n🎟{} {} ➡️ {target}",
                format.tx_link(&send.txid, &amount),
                format.script_link(&send.sender_script)
            );
        }
        push_overflow(&mut msg, block.token_sends.len(), format.max_token_sends);
    }

    if !block.token_burns.is_empty() {
        let _ = write!(
            msg,
            "\n\n<b>{}</b>",
            count_label(block.token_burns.len(), "eToken burn tx", "eToken burn txs")
        );
        for burn in &block.token_burns {
            let amount = token_amount_label(report.tokens.get(&burn.token_id), burn.atoms);
            let _ = write!(
                msg,
                "\n🔥{} burned {}",
                format.script_link(&burn.burner_script),
                format.tx_link(&burn.txid, &amount)
            );
        }
    }

    if !block.xec_sends.is_empty() {
        let _ = write!(
            msg,
            "\n\n<b>{}</b>",
            count_label(block.xec_sends.len(), "eCash tx", "eCash txs")
        );
        let mut sends: Vec<&XecSend> = block.xec_sends.iter().collect();
        sends.sort_by(|a, b| b.total_sats.cmp(&a.total_sats));
        for send in sends.iter().take(format.max_xec_sends) {
            msg.push('\n');
            msg.push_str(&xec_send_line(format, send, report));
        }
        push_overflow(&mut msg, block.xec_sends.len(), format.max_xec_sends);
    }

    msg
}

/// Sent when a block was found but could not be summarized.
pub fn fallback_message(height: u64, hash: &str, format: &MessageFormat) -> String {
    format!(
        "📦{} | New block\n\nA detailed summary is not available for this block.",
        format.block_link(hash, &height.to_string())
    )
}

/// Sent when a previously announced block leaves the main chain.
pub fn reorg_message(height: u64, hash: &str, format: &MessageFormat) -> String {
    format!(
        "⚠️ Block {} was orphaned by a chain reorganization.\n<code>{}</code>",
        format.block_link(hash, &height.to_string()),
        escape_html(hash)
    )
}

/// End-of-day statistics.
pub fn daily_summary_message(day: &DailySummary) -> String {
    let day_label = |d: NaiveDate| d.format("%b %-d, %Y").to_string();
    let date = match (day.date, day.end_date) {
        (Some(start), Some(end)) if end != start => {
            format!("{} to {}", day_label(start), day_label(end))
        }
        (Some(start), _) => day_label(start),
        (None, _) => "Today".to_string(),
    };
    let mut msg = format!("📊 <b>{date}</b>");

    if day.blocks == 0 {
        msg.push_str("\n\nNo blocks were found.");
        return msg;
    }

    let _ = write!(msg, "\n\n📦 {}", count_label(day.blocks as usize, "block", "blocks"));
    if let (Some(first), Some(last)) = (day.first_height, day.last_height) {
        let _ = write!(msg, " ({first} to {last})");
    }
    let _ = write!(msg, "\n🔁 {}", count_label(day.txs as usize, "tx", "txs"));
    let _ = write!(msg, "\n💸 {} XEC sent", format_xec(day.sats_sent));
    let _ = write!(msg, "\n🧾 {} XEC in fees", format_xec(day.fees_sats));

    if day.token_geneses > 0 {
        let _ = write!(
            msg,
            "\n🧪 {} created",
            count_label(day.token_geneses as usize, "new eToken", "new eTokens")
        );
    }
    if day.token_sends > 0 {
        let _ = write!(
            msg,
            "\n🎟 {}",
            count_label(day.token_sends as usize, "eToken send", "eToken sends")
        );
    }
    if day.token_burns > 0 {
        let _ = write!(
            msg,
            "\n🔥 {}",
            count_label(day.token_burns as usize, "eToken burn", "eToken burns")
        );
    }
    if day.app_txs > 0 {
        let _ = write!(msg, "\n📱 {}", count_label(day.app_txs as usize, "app tx", "app txs"));
    }
    if day.whale_sends > 0 {
        let _ = write!(
            msg,
            "\n🐋 {}",
            count_label(day.whale_sends as usize, "whale send", "whale sends")
        );
    }
    if day.staking_rewards > 0 {
        let _ = write!(
            msg,
            "\n💰 {}",
            count_label(
                day.staking_rewards as usize,
                "staking reward paid",
                "staking rewards paid"
            )
        );
    }

    let miners = day.top_miners();
    if !miners.is_empty() {
        msg.push_str("\n\n⛏️ <b>Miners</b>");
        for (name, blocks) in miners {
            let share = blocks * 100 / day.blocks;
            let _ = write!(
                msg,
                "\n• {}: {} ({share}%)",
                escape_html(name),
                count_label(blocks as usize, "block", "blocks")
            );
        }
    }

    msg
}

fn genesis_line(
    format: &MessageFormat,
    txid: &str,
    token_id: &str,
    info: Option<&TokenInfo>,
) -> String {
    let Some(genesis) = info.map(|i| &i.genesis_info) else {
        return format!(
            "🧪{}",
            format.tx_link(txid, &escape_html(&truncate(token_id, 12)))
        );
    };

    let name = if genesis.token_name.is_empty() {
        truncate(token_id, 12)
    } else {
        genesis.token_name.clone()
    };
    let mut line = format!("🧪{}", format.tx_link(txid, &escape_html(&name)));
    if !genesis.token_ticker.is_empty() {
        let _ = write!(line, " ({})", escape_html(&genesis.token_ticker));
    }
    if genesis.url.starts_with("http://") || genesis.url.starts_with("https://") {
        let _ = write!(line, " <a href=\"{}\">url</a>", escape_html(&genesis.url));
    }
    line
}

fn app_line(format: &MessageFormat, txid: &str, action: &AppAction, report: &BlockReport) -> String {
    let label = action.label();
    let (emoji, detail) = match action {
        AppAction::CashtabMsg { msg } => ("✏️", Some(truncate(msg, APP_TEXT_CHARS))),
        AppAction::EncryptedCashtabMsg => ("🔏", None),
        AppAction::Alias { alias } => ("👾", Some(alias.clone())),
        AppAction::Airdrop { token_id, msg } => {
            let token = report
                .tokens
                .get(token_id)
                .map(|info| info.genesis_info.token_ticker.clone())
                .filter(|ticker| !ticker.is_empty())
                .unwrap_or_else(|| truncate(token_id, 12));
            let detail = match msg {
                Some(msg) => format!("to {token} holders: {}", truncate(msg, APP_TEXT_CHARS)),
                None => format!("to {token} holders"),
            };
            ("🪂", Some(detail))
        }
        AppAction::Swap => ("🤳", None),
        AppAction::PayButton { data } => ("🛒", data.as_ref().map(|d| truncate(d, APP_TEXT_CHARS))),
        AppAction::Paywall { article_txid } => {
            let article = format.tx_link(article_txid, "article");
            return format!("🗞{} payment for {article}", format.tx_link(txid, label));
        }
        AppAction::Authentication => ("🔓", None),
        AppAction::Memo { action, text } => {
            let detail = match text {
                Some(text) => format!("{action}: {}", truncate(text, APP_TEXT_CHARS)),
                None => (*action).to_string(),
            };
            ("🗞", Some(detail))
        }
        AppAction::Unknown { prefix, text } => {
            let detail = match text {
                Some(text) => format!("{prefix} {}", truncate(text, APP_TEXT_CHARS)),
                None => prefix.clone(),
            };
            ("❓", Some(detail))
        }
    };

    match detail.filter(|d| !d.is_empty()) {
        Some(detail) => format!(
            "{emoji}{} {}",
            format.tx_link(txid, &format!("{label}:")),
            escape_html(&detail)
        ),
        None => format!("{emoji}{}", format.tx_link(txid, label)),
    }
}

fn xec_send_line(format: &MessageFormat, send: &XecSend, report: &BlockReport) -> String {
    let emoji = if send.is_whale { "🐋" } else { "💸" };
    let mut amount = format!("{} XEC", format_xec(send.total_sats));
    if let Some(prices) = &report.prices {
        let _ = write!(
            amount,
            " ({})",
            format_usd(sats_to_usd(send.total_sats, prices.xec_usd))
        );
    }

    let target = match send.recipients.as_slice() {
        [] => "itself".to_string(),
        [(script, _)] => format.script_link(script),
        many => format!("{} outputs", many.len()),
    };

    format!(
        "{emoji}{} {} ➡️ {target} | {} sats/byte",
        format.tx_link(&send.txid, &amount),
        format.script_link(&send.sender_script),
        send.fee_rate()
    )
}

fn token_amount_label(info: Option<&TokenInfo>, atoms: u64) -> String {
    match info {
        Some(info) => {
            let genesis = &info.genesis_info;
            let amount = format_token_amount(atoms, genesis.decimals);
            if genesis.token_ticker.is_empty() {
                amount
            } else {
                format!("{amount} {}", escape_html(&genesis.token_ticker))
            }
        }
        None => format!("{} atoms", format_token_amount(atoms, 0)),
    }
}

fn push_overflow(msg: &mut String, total: usize, shown: usize) {
    if total > shown {
        let _ = write!(msg, "\n...and {} more", total - shown);
    }
}

fn count_label(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Split a message into parts Telegram accepts, breaking on line boundaries.
///
/// Lines longer than `max_chars` are hard-split on char boundaries.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut parts = Vec::new();
    // Part being built and its length in chars.
    let mut current: Option<(String, usize)> = None;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        if let Some((part, len)) = current.as_mut() {
            if *len + 1 + line_len <= max_chars {
                part.push('\n');
                part.push_str(line);
                *len += 1 + line_len;
                continue;
            }
        }
        if let Some((part, _)) = current.take() {
            parts.push(part);
        }

        if line_len <= max_chars {
            current = Some((line.to_string(), line_len));
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(max_chars) {
            let piece: String = chunk.iter().collect();
            if chunk.len() == max_chars {
                parts.push(piece);
            } else {
                current = Some((piece, chunk.len()));
            }
        }
    }

    if let Some((part, _)) = current {
        parts.push(part);
    }
    parts
}

/// Truncate a string with ellipsis (Unicode-safe).
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Escape text for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
