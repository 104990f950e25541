use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::schema::FieldErrorKind;
use crate::wizard::WizardStep;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh_CN")]
    ZhCn,
    #[serde(rename = "zh_TW")]
    ZhTw,
    #[serde(rename = "ja")]
    Ja,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::ZhCn => "zh_CN",
            Language::ZhTw => "zh_TW",
            Language::Ja => "ja",
        }
    }

    pub fn timezone(&self) -> &'static str {
        match self {
            Language::En => "America/New_York",
            Language::ZhCn => "Asia/Shanghai",
            Language::ZhTw => "Asia/Hong_Kong",
            Language::Ja => "Asia/Tokyo",
        }
    }

    /// strftime pattern for date plus time.
    pub fn datetime_format(&self) -> &'static str {
        match self {
            Language::En => "%m/%d/%Y %I:%M %p",
            Language::ZhCn | Language::ZhTw => "%Y年%m月%d日 %H:%M",
            Language::Ja => "%Y/%m/%d %H:%M",
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "en" => Ok(Language::En),
            "zh_CN" | "zh-CN" => Ok(Language::ZhCn),
            "zh_TW" | "zh-TW" => Ok(Language::ZhTw),
            "ja" => Ok(Language::Ja),
            other => Err(anyhow!("unsupported language: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    ConnectionOk,
    ConnectionFailed,
    ConnectionNetworkError,
    ConnectionInFlight,
    ConnectionNotRequired,
}

pub fn text(lang: Language, msg: Msg) -> &'static str {
    use Language::*;
    use Msg::*;
    match (msg, lang) {
        (ConnectionOk, En) => "Connection successful",
        (ConnectionOk, ZhCn) => "连接成功",
        (ConnectionOk, ZhTw) => "連線成功",
        (ConnectionOk, Ja) => "接続に成功しました",
        (ConnectionFailed, En) => "Connection failed",
        (ConnectionFailed, ZhCn) => "连接失败",
        (ConnectionFailed, ZhTw) => "連線失敗",
        (ConnectionFailed, Ja) => "接続に失敗しました",
        (ConnectionNetworkError, En) => "Unable to reach the server",
        (ConnectionNetworkError, ZhCn) => "无法连接到服务器",
        (ConnectionNetworkError, ZhTw) => "無法連線到伺服器",
        (ConnectionNetworkError, Ja) => "サーバーに接続できません",
        (ConnectionInFlight, En) => "A connection test is already running",
        (ConnectionInFlight, ZhCn) => "连接测试正在进行中",
        (ConnectionInFlight, ZhTw) => "連線測試正在進行中",
        (ConnectionInFlight, Ja) => "接続テストを実行中です",
        (ConnectionNotRequired, En) => "Virtual trading needs no exchange connection",
        (ConnectionNotRequired, ZhCn) => "虚拟交易无需连接交易所",
        (ConnectionNotRequired, ZhTw) => "虛擬交易無需連線交易所",
        (ConnectionNotRequired, Ja) => "仮想取引では取引所への接続は不要です",
    }
}

pub fn step_title(lang: Language, step: WizardStep) -> &'static str {
    use Language::*;
    match (step, lang) {
        (WizardStep::Model, En) => "AI Model",
        (WizardStep::Model, ZhCn) => "AI 模型",
        (WizardStep::Model, ZhTw) => "AI 模型",
        (WizardStep::Model, Ja) => "AI モデル",
        (WizardStep::Exchange, En) => "Exchange",
        (WizardStep::Exchange, ZhCn) => "交易所",
        (WizardStep::Exchange, ZhTw) => "交易所",
        (WizardStep::Exchange, Ja) => "取引所",
        (WizardStep::Strategy, En) => "Strategy",
        (WizardStep::Strategy, ZhCn) => "交易策略",
        (WizardStep::Strategy, ZhTw) => "交易策略",
        (WizardStep::Strategy, Ja) => "取引戦略",
    }
}

pub fn field_error(lang: Language, kind: &FieldErrorKind) -> String {
    use FieldErrorKind::*;
    use Language::*;
    match (kind, lang) {
        (Required, En) => "This field is required".into(),
        (Required, ZhCn) => "此字段为必填项".into(),
        (Required, ZhTw) => "此欄位為必填".into(),
        (Required, Ja) => "この項目は必須です".into(),
        (InvalidNumber, En) => "Must be a number".into(),
        (InvalidNumber, ZhCn) => "必须是数字".into(),
        (InvalidNumber, ZhTw) => "必須是數字".into(),
        (InvalidNumber, Ja) => "数値を入力してください".into(),
        (NotInteger, En) => "Must be a whole number".into(),
        (NotInteger, ZhCn) => "必须是整数".into(),
        (NotInteger, ZhTw) => "必須是整數".into(),
        (NotInteger, Ja) => "整数を入力してください".into(),
        (MustBePositive, En) => "Must be greater than 0".into(),
        (MustBePositive, ZhCn) => "必须大于 0".into(),
        (MustBePositive, ZhTw) => "必須大於 0".into(),
        (MustBePositive, Ja) => "0 より大きい値を入力してください".into(),
        (OutOfRange { min, max }, En) => format!("Must be between {min} and {max}"),
        (OutOfRange { min, max }, ZhCn) => format!("必须介于 {min} 和 {max} 之间"),
        (OutOfRange { min, max }, ZhTw) => format!("必須介於 {min} 和 {max} 之間"),
        (OutOfRange { min, max }, Ja) => format!("{min} から {max} の間で入力してください"),
        (UnsupportedExchange(id), En) => format!("Unsupported exchange: {id}"),
        (UnsupportedExchange(id), ZhCn) => format!("不支持的交易所：{id}"),
        (UnsupportedExchange(id), ZhTw) => format!("不支援的交易所：{id}"),
        (UnsupportedExchange(id), Ja) => format!("未対応の取引所です：{id}"),
        (InvalidOption(v), En) => format!("Invalid option: {v}"),
        (InvalidOption(v), ZhCn) => format!("无效选项：{v}"),
        (InvalidOption(v), ZhTw) => format!("無效選項：{v}"),
        (InvalidOption(v), Ja) => format!("無効な選択肢です：{v}"),
        (GridSingleSymbol, En) => "Grid strategies trade exactly one symbol".into(),
        (GridSingleSymbol, ZhCn) => "网格策略只能选择一个交易对".into(),
        (GridSingleSymbol, ZhTw) => "網格策略只能選擇一個交易對".into(),
        (GridSingleSymbol, Ja) => "グリッド戦略では銘柄を1つだけ選択できます".into(),
        (TooManySymbols { max }, En) => format!("At most {max} symbols are allowed"),
        (TooManySymbols { max }, ZhCn) => format!("最多只能选择 {max} 个交易对"),
        (TooManySymbols { max }, ZhTw) => format!("最多只能選擇 {max} 個交易對"),
        (TooManySymbols { max }, Ja) => format!("選択できる銘柄は最大 {max} 個です"),
        (UnknownField, En) => "Unknown field".into(),
        (UnknownField, ZhCn) => "未知字段".into(),
        (UnknownField, ZhTw) => "未知欄位".into(),
        (UnknownField, Ja) => "不明な項目です".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_serializes_as_locale_code() {
        assert_eq!(serde_json::to_string(&Language::ZhCn).unwrap(), "\"zh_CN\"");
        assert_eq!(serde_json::from_str::<Language>("\"ja\"").unwrap(), Language::Ja);
    }

    #[test]
    fn language_parses_locale_codes() {
        assert_eq!("zh-TW".parse::<Language>().unwrap(), Language::ZhTw);
        assert_eq!(" ja ".parse::<Language>().unwrap(), Language::Ja);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn range_message_includes_bounds() {
        let msg = field_error(Language::En, &FieldErrorKind::OutOfRange { min: 10.0, max: 3600.0 });
        assert_eq!(msg, "Must be between 10 and 3600");
    }
}
