//! # 添付ファイルの展開
//!
//! リクエストの base64 文字列をデコードし、メッセージに添付できる
//! バイト列にする。デコードはリクエスト単位で 1 回だけ行い、
//! 展開された全メッセージで同じバッファ（[`Bytes`]）を共有する。

use std::borrow::Cow;

use base64::{
    Engine as _,
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
};
use bytes::Bytes;

use super::Attachment;
use crate::error::ValidationError;

/// 標準アルファベット・パディング必須。末尾の余りビットが 0 でなくても受け付ける。
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// MIME タイプ未指定時の既定値
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 添付の表示方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Disposition {
    /// 通常の添付ファイル
    #[default]
    Attachment,
    /// 本文中に埋め込む（`content_id` で参照される）
    Inline,
}

impl Disposition {
    /// リクエストの `disposition` 値から判定する
    ///
    /// `inline` 以外（空文字列を含む）はすべて通常の添付として扱う。
    pub fn from_wire(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("inline") {
            Self::Inline
        } else {
            Self::Attachment
        }
    }
}

/// デコード済みの添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAttachment {
    pub filename:     String,
    pub content_type: String,
    pub disposition:  Disposition,
    pub content_id:   Option<String>,
    pub data:         Bytes,
}

/// 添付ファイル 1 件をデコードする
///
/// `index` はリクエストの `attachments` 配列内の位置で、エラーの
/// `field`（`attachments.<index>.content`）に使われる。
pub fn stage(attachment: &Attachment, index: usize) -> Result<StagedAttachment, ValidationError> {
    let data = decode_base64(&attachment.content)
        .map_err(|_| ValidationError::attachment_not_base64(index))?;

    let content_type = match attachment.content_type.trim() {
        "" => DEFAULT_CONTENT_TYPE.to_string(),
        declared => declared.to_string(),
    };

    Ok(StagedAttachment {
        filename: attachment.filename.clone(),
        content_type,
        disposition: Disposition::from_wire(&attachment.disposition),
        content_id: (!attachment.content_id.is_empty()).then(|| attachment.content_id.clone()),
        data: Bytes::from(data),
    })
}

/// 添付ファイルを配列順にデコードする
///
/// 最初に失敗した添付で打ち切り、それ以降はデコードしない。
pub fn stage_all(attachments: &[Attachment]) -> Result<Vec<StagedAttachment>, ValidationError> {
    attachments
        .iter()
        .enumerate()
        .map(|(index, attachment)| stage(attachment, index))
        .collect()
}

/// 標準アルファベット・パディングありの base64 をデコードする
///
/// 行折り返し（CR / LF）は読み飛ばす。
fn decode_base64(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: Cow<'_, str> = if content.contains(['\r', '\n']) {
        Cow::Owned(content.chars().filter(|c| !matches!(c, '\r' | '\n')).collect())
    } else {
        Cow::Borrowed(content)
    };
    BASE64.decode(compact.as_bytes())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn attachment(content: &str) -> Attachment {
        Attachment {
            content: content.to_string(),
            content_type: "text/plain".to_string(),
            filename: "attachment.txt".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn base64をデコードしてファイル名と対応付ける() {
        let staged = stage(&attachment("dGVzdA=="), 0).unwrap();

        assert_eq!(
            staged,
            StagedAttachment {
                filename:     "attachment.txt".to_string(),
                content_type: "text/plain".to_string(),
                disposition:  Disposition::Attachment,
                content_id:   None,
                data:         Bytes::from_static(b"test"),
            }
        );
    }

    #[test]
    fn 行折り返しされたbase64もデコードできる() {
        let staged = stage(&attachment("aGVsbG8g\r\nd29y\nbGQ="), 0).unwrap();

        assert_eq!(staged.data, Bytes::from_static(b"hello world"));
    }

    #[test]
    fn 末尾の余りビットが0でなくてもデコードできる() {
        let staged = stage(&attachment("dGVzdB=="), 0).unwrap();

        assert_eq!(staged.data, Bytes::from_static(b"test"));
    }

    #[test]
    fn 空のcontentは空のファイルになる() {
        let staged = stage(&attachment(""), 0).unwrap();

        assert!(staged.data.is_empty());
    }

    #[rstest]
    #[case::記号を含む("NOT_BASE64")]
    #[case::パディング不足("dGVzdA")]
    #[case::url_safe文字("-_-_")]
    #[case::空白を含む("dGVz dA==")]
    fn 不正なbase64はattachmentsエラーになる(#[case] content: &str) {
        assert_eq!(
            stage(&attachment(content), 2),
            Err(ValidationError::attachment_not_base64(2))
        );
    }

    #[test]
    fn mimeタイプが空ならoctet_streamにする() {
        let mut source = attachment("dGVzdA==");
        source.content_type = String::new();

        let staged = stage(&source, 0).unwrap();

        assert_eq!(staged.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn inline指定とcontent_idを引き継ぐ() {
        let mut source = attachment("dGVzdA==");
        source.disposition = "INLINE".to_string();
        source.content_id = "logo".to_string();

        let staged = stage(&source, 0).unwrap();

        assert_eq!(staged.disposition, Disposition::Inline);
        assert_eq!(staged.content_id.as_deref(), Some("logo"));
    }

    #[rstest]
    #[case("inline", Disposition::Inline)]
    #[case(" Inline ", Disposition::Inline)]
    #[case("attachment", Disposition::Attachment)]
    #[case("", Disposition::Attachment)]
    #[case("unknown", Disposition::Attachment)]
    fn dispositionの判定(#[case] wire: &str, #[case] expected: Disposition) {
        assert_eq!(Disposition::from_wire(wire), expected);
    }

    #[test]
    fn dispositionの文字列表現は小文字() {
        assert_eq!(Disposition::Inline.to_string(), "inline");
        assert_eq!(Disposition::Attachment.to_string(), "attachment");
    }

    #[test]
    fn stage_allは配列順にデコードする() {
        let staged = stage_all(&[attachment("YQ=="), attachment("Yg==")]).unwrap();

        let data: Vec<_> = staged.iter().map(|s| s.data.clone()).collect();
        assert_eq!(data, vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")]);
    }

    #[test]
    fn stage_allは最初に失敗した添付の位置を報告する() {
        let attachments = [
            attachment("dGVzdA=="),
            attachment("NOT_BASE64"),
            attachment("ALSO NOT BASE64"),
        ];

        assert_eq!(
            stage_all(&attachments),
            Err(ValidationError::attachment_not_base64(1))
        );
    }

    #[test]
    fn 添付がなければ空の配列を返す() {
        assert_eq!(stage_all(&[]), Ok(Vec::new()));
    }
}
