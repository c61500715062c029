use std::io::{Cursor, Write};
use std::path::PathBuf;

use ingest_engine::{
    docx_text_from_bytes, extract_file, pdf_text_from_bytes, ExtractError, OcrSettings,
    SourceFormat,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use pretty_assertions::assert_eq;
use tempfile::{NamedTempFile, TempDir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn temp_file_with(suffix: &str, bytes: &[u8]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn docx_bytes(document_xml: Option<&str>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    if let Some(xml) = document_xml {
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn text_op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// Single-page PDF whose page resources name each font as `F1`, `F2`, ...
fn single_page_pdf(
    build_fonts: impl FnOnce(&mut Document) -> Vec<ObjectId>,
    operations: Vec<Operation>,
) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut fonts = Dictionary::new();
    for (index, font_id) in build_fonts(&mut doc).into_iter().enumerate() {
        fonts.set(format!("F{}", index + 1), font_id);
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => fonts },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn hex(bytes: &[u8]) -> Object {
    Object::String(bytes.to_vec(), StringFormat::Hexadecimal)
}

/// One page whose first line is drawn in two pieces on the same baseline.
fn pdf_bytes() -> Vec<u8> {
    single_page_pdf(
        |doc| {
            vec![doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            })]
        },
        vec![
            text_op("BT", vec![]),
            text_op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            text_op("Td", vec![Object::Integer(72), Object::Integer(700)]),
            text_op("Tj", vec![Object::string_literal("Hello ")]),
            text_op("Td", vec![Object::Integer(40), Object::Integer(0)]),
            text_op("Tj", vec![Object::string_literal("World")]),
            text_op("Td", vec![Object::Integer(-40), Object::Integer(-20)]),
            text_op("Tj", vec![Object::string_literal("Second line")]),
            text_op("ET", vec![]),
        ],
    )
}

const IDENTITY_TO_UNICODE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange <0000> <FFFF> endcodespacerange
2 beginbfchar
<0001> <0048>
<0002> <0069>
endbfchar
1 beginbfrange
<0003> <0005> <0061>
endbfrange
endcmap
end
end";

#[tokio::test]
async fn plain_text_is_normalized() {
    ingest_logging::initialize_for_tests();
    let file = temp_file_with(".txt", b"  first line  \n\n\t\nsecond line\r\n   \n");
    let text = extract_file(file.path(), &OcrSettings::default())
        .await
        .unwrap();
    assert_eq!(text, "first line\nsecond line");
}

#[tokio::test]
async fn docx_paragraphs_become_lines() {
    let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
        <w:p><w:r><w:t>Quarterly report</w:t></w:r></w:p>
        <w:p><w:r><w:t xml:space="preserve">  Revenue grew  </w:t></w:r></w:p>
        <w:p></w:p>
    </w:body></w:document>"#;
    let file = temp_file_with(".docx", &docx_bytes(Some(xml)));

    let text = extract_file(file.path(), &OcrSettings::default())
        .await
        .unwrap();

    assert_eq!(text, "Quarterly report\nRevenue grew");
}

#[test]
fn docx_without_document_part_is_a_parse_error() {
    let err = docx_text_from_bytes(&docx_bytes(None)).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Parse {
            format: SourceFormat::Docx,
            ..
        }
    ));
}

#[test]
fn docx_that_is_not_a_zip_is_a_parse_error() {
    let err = docx_text_from_bytes(b"plain bytes, no archive here").unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse docx file"));
}

#[test]
fn pdf_runs_on_one_baseline_share_a_line() {
    let text = pdf_text_from_bytes(&pdf_bytes()).unwrap();
    assert_eq!(text, "Hello World\nSecond line");
}

#[test]
fn pdf_winansi_font_decodes_typographic_bytes() {
    let bytes = single_page_pdf(
        |doc| {
            vec![doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "TrueType",
                "BaseFont" => "Arial",
                "Encoding" => "WinAnsiEncoding",
            })]
        },
        vec![
            text_op("BT", vec![]),
            text_op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            text_op("Td", vec![Object::Integer(72), Object::Integer(700)]),
            text_op("Tj", vec![hex(b"\x93Hi\x94 \x80 5 \x96 ok")]),
            text_op("ET", vec![]),
        ],
    );

    let text = pdf_text_from_bytes(&bytes).unwrap();

    assert_eq!(text, "\u{201c}Hi\u{201d} \u{20ac} 5 \u{2013} ok");
}

#[test]
fn pdf_differences_rename_codes() {
    let bytes = single_page_pdf(
        |doc| {
            vec![doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Custom",
                "Encoding" => dictionary! {
                    "Type" => "Encoding",
                    "BaseEncoding" => "WinAnsiEncoding",
                    "Differences" => vec![
                        Object::Integer(1),
                        Object::Name(b"T".to_vec()),
                        Object::Name(b"fi".to_vec()),
                        Object::Name(b"uni00E9".to_vec()),
                    ],
                },
            })]
        },
        vec![
            text_op("BT", vec![]),
            text_op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            text_op("Tj", vec![hex(&[1, 2, 3, b'!'])]),
            text_op("ET", vec![]),
        ],
    );

    assert_eq!(pdf_text_from_bytes(&bytes).unwrap(), "T\u{fb01}\u{e9}!");
}

#[test]
fn pdf_type0_font_decodes_through_to_unicode() {
    let bytes = single_page_pdf(
        |doc| {
            let to_unicode =
                doc.add_object(Stream::new(dictionary! {}, IDENTITY_TO_UNICODE.to_vec()));
            let descendant = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType2",
                "BaseFont" => "Embedded",
            });
            let composite = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => "Embedded",
                "Encoding" => "Identity-H",
                "DescendantFonts" => vec![descendant.into()],
                "ToUnicode" => to_unicode,
            });
            let plain = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            });
            vec![composite, plain]
        },
        vec![
            text_op("BT", vec![]),
            text_op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            text_op("Td", vec![Object::Integer(72), Object::Integer(700)]),
            text_op("Tj", vec![hex(&[0x00, 0x01, 0x00, 0x02])]),
            text_op(
                "TJ",
                vec![Object::Array(vec![
                    Object::Integer(-300),
                    hex(&[0x00, 0x03, 0x00, 0x04, 0x00, 0x05]),
                ])],
            ),
            text_op("Tf", vec![Object::Name(b"F2".to_vec()), Object::Integer(12)]),
            text_op("Td", vec![Object::Integer(0), Object::Integer(-20)]),
            text_op("Tj", vec![Object::string_literal("plain")]),
            text_op("ET", vec![]),
        ],
    );

    assert_eq!(pdf_text_from_bytes(&bytes).unwrap(), "Hi abc\nplain");
}

#[tokio::test]
async fn pdf_file_is_dispatched_by_extension() {
    let file = temp_file_with(".PDF", &pdf_bytes());
    let text = extract_file(file.path(), &OcrSettings::default())
        .await
        .unwrap();
    assert!(text.starts_with("Hello World"));
}

#[test]
fn garbage_pdf_is_a_parse_error() {
    let err = pdf_text_from_bytes(b"%PDF-1.4 truncated").unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Parse {
            format: SourceFormat::Pdf,
            ..
        }
    ));
}

#[tokio::test]
async fn missing_recognizer_is_a_recognition_error() {
    let image = temp_file_with(".png", b"not really a png");
    let settings = OcrSettings {
        program: PathBuf::from("/nonexistent/bin/tesseract"),
        ..OcrSettings::default()
    };
    let err = extract_file(image.path(), &settings).await.unwrap_err();
    assert!(matches!(err, ExtractError::Recognition(_)));
    assert!(err.to_string().starts_with("Failed to recognize text"));
}

#[cfg(unix)]
#[tokio::test]
async fn recognizer_stdout_becomes_the_text() {
    let image = temp_file_with(".png", b"pixels");
    let settings = OcrSettings {
        program: PathBuf::from("echo"),
        language: "deu".to_string(),
        ..OcrSettings::default()
    };
    let text = extract_file(image.path(), &settings).await.unwrap();
    assert!(text.ends_with("stdout -l deu"));
}

#[tokio::test]
async fn image_that_does_not_exist_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = extract_file(&dir.path().join("scan.png"), &OcrSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Read {
            format: SourceFormat::Image,
            ..
        }
    ));
}

#[tokio::test]
async fn missing_text_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = extract_file(&dir.path().join("notes.txt"), &OcrSettings::default())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to read text file"));
}

#[tokio::test]
async fn unknown_extension_is_unsupported() {
    let file = temp_file_with(".pages", b"whatever");
    let err = extract_file(file.path(), &OcrSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Unsupported { .. }));
}
