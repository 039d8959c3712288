use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Document, Object};

/// Create a PDF with the specified number of empty pages
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..num_pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => kids,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Assemble a classic-xref PDF by hand. Objects are numbered from 1 in order;
/// `trailer_entries` is spliced into the trailer dictionary after `/Size`.
pub fn raw_pdf(objects: &[&str], trailer_entries: &str) -> Vec<u8> {
    raw_pdf_with_trailer(objects, |_| trailer_entries.to_string())
}

/// Like [`raw_pdf`], but the trailer entries may depend on the xref offset
pub fn raw_pdf_with_trailer(objects: &[&str], trailer_entries: impl FnOnce(usize) -> String) -> Vec<u8> {
    let (mut out, offsets) = raw_body("1.4", objects);

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} {} >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            trailer_entries(xref_offset),
            xref_offset
        )
        .as_bytes(),
    );
    out
}

/// Header and numbered objects, with the offset of each object
fn raw_body(version: &str, objects: &[&str]) -> (Vec<u8>, Vec<usize>) {
    let mut out = format!("%PDF-{}\n", version).into_bytes();
    let mut offsets = Vec::with_capacity(objects.len());

    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
    }
    (out, offsets)
}

fn stream_object(dict_entries: &str, content: &str) -> String {
    format!(
        "<< {} /Length {} >>\nstream\n{}\nendstream",
        dict_entries,
        content.len(),
        content
    )
}

fn nested_array(depth: usize) -> String {
    format!("{}{}", "[".repeat(depth), "]".repeat(depth))
}

fn standard_security_handler() -> String {
    let owner = "<".to_string() + &"AB".repeat(32) + ">";
    let user = "<".to_string() + &"CD".repeat(32) + ">";
    format!("<< /Filter /Standard /V 1 /R 2 /O {owner} /U {user} /P -44 >>")
}

fn file_id() -> String {
    let id = "<".to_string() + &"01".repeat(16) + ">";
    format!("[{id} {id}]")
}

const CATALOG: &str = "<< /Type /Catalog /Pages 2 0 R >>";
const ONE_PAGE_TREE: &str = "<< /Type /Pages /Kids [3 0 R] /Count 1 >>";
const PAGE: &str = "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>";

/// Hand-assembled single-page PDF
pub fn raw_single_page_pdf() -> Vec<u8> {
    raw_pdf(&[CATALOG, ONE_PAGE_TREE, PAGE], "/Root 1 0 R")
}

/// Hand-assembled PDF whose page tree is empty
pub fn raw_empty_page_tree_pdf() -> Vec<u8> {
    raw_pdf(
        &[CATALOG, "<< /Type /Pages /Kids [] /Count 0 >>"],
        "/Root 1 0 R",
    )
}

/// Hand-assembled single-page PDF with a standard security handler in the trailer
pub fn raw_encrypted_pdf() -> Vec<u8> {
    let encrypt = standard_security_handler();
    raw_pdf(
        &[CATALOG, ONE_PAGE_TREE, PAGE, &encrypt],
        &format!("/Root 1 0 R /Encrypt 4 0 R /ID {}", file_id()),
    )
}

/// Single-page PDF whose page content mentions `/Encrypt 5 0 R` as text
pub fn raw_encrypt_text_in_content_pdf() -> Vec<u8> {
    let page = "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>";
    let content = stream_object("", "BT /F1 12 Tf 72 700 Td (/Encrypt 5 0 R) Tj ET");
    raw_pdf(&[CATALOG, ONE_PAGE_TREE, page, &content], "/Root 1 0 R")
}

/// Single-page PDF carrying an object with 200,000 nested arrays
pub fn raw_deeply_nested_pdf() -> Vec<u8> {
    let deep = format!("<< /X {} >>", nested_array(200_000));
    raw_pdf(&[CATALOG, ONE_PAGE_TREE, PAGE, &deep], "/Root 1 0 R")
}

/// Single-page PDF with an uncompressed object stream holding one array nested `depth`
/// levels deep
pub fn raw_object_stream_pdf(depth: usize) -> Vec<u8> {
    let index = "5 0 ";
    let object_stream = stream_object(
        &format!("/Type /ObjStm /N 1 /First {}", index.len()),
        &format!("{}{}", index, nested_array(depth)),
    );
    raw_pdf(&[CATALOG, ONE_PAGE_TREE, PAGE, &object_stream], "/Root 1 0 R")
}

/// PDF whose page tree lists itself among its own kids
pub fn raw_cyclic_page_tree_pdf() -> Vec<u8> {
    raw_pdf(
        &[CATALOG, "<< /Type /Pages /Kids [3 0 R 2 0 R] /Count 2 >>", PAGE],
        "/Root 1 0 R",
    )
}

/// Single-page PDF whose trailer `/Prev` points back at its own xref section
pub fn raw_self_referencing_prev_pdf() -> Vec<u8> {
    raw_pdf_with_trailer(&[CATALOG, ONE_PAGE_TREE, PAGE], |xref_offset| {
        format!("/Root 1 0 R /Prev {}", xref_offset)
    })
}

/// PDF 1.5 file indexed by a cross-reference stream whose dictionary carries an
/// inline `/Encrypt` dictionary
pub fn raw_xref_stream_encrypted_pdf() -> Vec<u8> {
    let (mut out, mut offsets) = raw_body("1.5", &[CATALOG, ONE_PAGE_TREE, PAGE]);
    let xref_offset = out.len();
    offsets.push(xref_offset);

    // W [1 4 2]: type, offset, generation
    let mut entries = vec![0u8, 0, 0, 0, 0, 0xFF, 0xFF];
    for offset in &offsets {
        entries.push(1);
        entries.extend_from_slice(&(*offset as u32).to_be_bytes());
        entries.extend_from_slice(&[0, 0]);
    }

    let size = offsets.len() + 1;
    out.extend_from_slice(
        format!(
            "{} 0 obj\n<< /Type /XRef /Size {} /W [1 4 2] /Root 1 0 R /Encrypt {} /ID {} /Length {} >>\nstream\n",
            size - 1,
            size,
            standard_security_handler(),
            file_id(),
            entries.len()
        )
        .as_bytes(),
    );
    out.extend_from_slice(&entries);
    out.extend_from_slice(format!("\nendstream\nendobj\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes());
    out
}

/// Valid PDF preceded by `junk_len` bytes of whitespace
pub fn pdf_with_leading_junk(junk_len: usize) -> Vec<u8> {
    let mut data = vec![b' '; junk_len];
    data.extend(create_test_pdf(2));
    data
}

/// Solid-colour RGB image encoded in `format`
pub fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 120, 200]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    create_test_image(width, height, ImageFormat::Png)
}
