//! User-facing replies and keywords.

use std::time::Duration;

pub const GRAY_COMMAND: &str = "幻影坦克";
pub const COLOR_COMMAND: &str = "彩色幻影坦克";
pub const CANCEL_KEYWORD: &str = "取消";

pub const NOT_AN_IMAGE: &str = "这不是一张图片，请重新发送喵";
pub const CANCELLED: &str = "已取消幻影坦克生成喵~";
pub const FRONT_RECEIVED: &str = "收到表图喵！请发送里图～";
pub const BACK_RECEIVED: &str = "收到里图喵！请等待幻影坦克生成喵～";
pub const FINISHED: &str = "幻影坦克生成完毕！请签收喵～";
pub const DOWNLOAD_FAILED: &str = "图片下载失败，请稍后再试喵";
pub const PROCESSING_FAILED: &str = "图片处理失败，请稍后再试喵";
pub const TIMED_OUT: &str = "已超时，幻影坦克生成已取消喵";
pub const UNEXPECTED: &str = "发生未知错误，请重试喵";

pub fn front_prompt(timeout: Duration) -> String {
    format!("请发送表图，{}s 内有效喵", timeout.as_secs())
}
