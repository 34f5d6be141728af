//! Tests for line-log and CSV rendering and file-backed writers.

use rstest::{fixture, rstest};

use super::{
    COLUMNS,
    FileSinkWriter,
    FlushedMessage,
    LineLog,
    MemorySink,
    MessageSink,
    OutputPaths,
    SinkWriter,
    TabularLog,
    encode_record,
};
use crate::{frame::parse_line, store::MessageId};

const HEADER: &str = "protocol,transmission,frame_cycle,frame_num,frame_phase,capcode,address_ls,\
                      address_gs,page_type,frag_indicator,frag_cont,frag_flag,message,message_id\r\n";

#[fixture]
fn hello_world() -> FlushedMessage {
    let rows = [
        "FLEX|1600/2|00.001.A|0001234567|LS|5|ALN|3.1.F|HELLO ",
        "FLEX|1600/2|00.002.A|0001234567|LS|5|ALN|3.0.C|WORLD",
    ]
    .into_iter()
    .map(|line| parse_line(line).expect("valid frame").metadata)
    .collect();
    FlushedMessage::new(MessageId::new(0), rows, "HELLO WORLD".to_owned(), true)
}

fn numeric(text: &str, id: u64) -> FlushedMessage {
    let frame = parse_line("FLEX|3200/4|12.045.C|0000000042|SG|3|NUM|1").expect("valid frame");
    FlushedMessage::new(MessageId::new(id), vec![frame.metadata], text.to_owned(), true)
}

#[rstest]
#[tokio::test]
async fn line_log_writes_rows_text_and_separator(hello_world: FlushedMessage) {
    let mut log = LineLog::new(Vec::new());
    log.write(&hello_world).await.expect("write to memory");

    let written = String::from_utf8(log.into_inner()).expect("utf-8 output");
    assert_eq!(
        written,
        "FLEX|1600/2|00.001.A|0001234567|LS|5|ALN|3.1.F\nFLEX|1600/2|00.002.A|0001234567|LS|5|ALN|\
         3.0.C\n└─ HELLO WORLD\n\n"
    );
}

#[rstest]
#[tokio::test]
async fn tabular_log_writes_header_once_and_row_per_fragment(hello_world: FlushedMessage) {
    let mut log = TabularLog::start(Vec::new()).await.expect("header");
    log.write(&hello_world).await.expect("write to memory");
    log.write(&numeric("1", 1)).await.expect("write to memory");

    let written = String::from_utf8(log.into_inner()).expect("utf-8 output");
    let expected = format!(
        "{HEADER}FLEX,1600/2,0,1,A,0001234567,L,S,ALN,3,1,F,HELLO WORLD,0\r\nFLEX,1600/2,0,2,A,\
         0001234567,L,S,ALN,3,0,C,HELLO WORLD,0\r\nFLEX,3200/4,12,45,C,0000000042,S,G,NUM,,,,1,1\r\n"
    );
    assert_eq!(written, expected);
    assert_eq!(written.matches("protocol,").count(), 1);
}

#[tokio::test]
async fn resumed_tabular_log_skips_header() {
    let mut log = TabularLog::resume(Vec::new());
    log.write(&numeric("1", 7)).await.expect("write to memory");
    let written = String::from_utf8(log.into_inner()).expect("utf-8 output");
    assert!(!written.contains("protocol"));
    assert!(written.ends_with(",1,7\r\n"));
}

#[rstest]
#[case(&["plain", "a,b"], "plain,\"a,b\"\r\n")]
#[case(&["say \"hi\""], "\"say \"\"hi\"\"\"\r\n")]
#[case(&["line\nbreak", ""], "\"line\nbreak\",\r\n")]
fn csv_fields_are_quoted_when_needed(#[case] fields: &[&str], #[case] expected: &str) {
    assert_eq!(encode_record(fields), expected);
}

#[test]
fn header_lists_every_column() {
    assert_eq!(encode_record(&COLUMNS), HEADER);
}

#[rstest]
#[tokio::test]
async fn sink_writer_fans_out_to_both_logs(hello_world: FlushedMessage) {
    let table = TabularLog::start(Vec::new()).await.expect("header");
    let mut writer = SinkWriter::new(LineLog::new(Vec::new()), table);
    writer.write(&hello_world).await.expect("write to memory");

    let (lines, table) = writer.finish().await.expect("flush");
    assert!(String::from_utf8(lines).expect("utf-8").contains("└─ HELLO WORLD"));
    assert_eq!(
        String::from_utf8(table)
            .expect("utf-8")
            .matches("HELLO WORLD,0")
            .count(),
        2
    );
}

#[rstest]
#[tokio::test]
async fn file_writer_appends_without_repeating_header(hello_world: FlushedMessage) {
    let dir = tempfile::tempdir().expect("temp dir");
    let paths = OutputPaths {
        line_log: dir.path().join("nested/out.txt"),
        tabular_log: dir.path().join("nested/out.csv"),
    };

    for _ in 0..2 {
        let mut writer = FileSinkWriter::open(&paths).await.expect("open outputs");
        writer.write(&hello_world).await.expect("write");
        writer.finish().await.expect("flush");
    }

    let csv = std::fs::read_to_string(&paths.tabular_log).expect("read csv");
    let log = std::fs::read_to_string(&paths.line_log).expect("read log");
    assert_eq!(csv.matches("protocol,").count(), 1);
    assert_eq!(csv.lines().count(), 5);
    assert_eq!(log.matches("└─ HELLO WORLD").count(), 2);
}

#[tokio::test]
async fn open_reports_the_failing_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"").expect("create blocker");
    let paths = OutputPaths {
        line_log: blocker.join("out.txt"),
        tabular_log: blocker.join("out.csv"),
    };

    let err = FileSinkWriter::open(&paths)
        .await
        .expect_err("cannot create a directory under a file");
    assert!(err.to_string().contains("out.txt"), "unexpected error: {err}");
}

#[tokio::test]
async fn memory_sink_records_messages_and_flushes() {
    let mut sink = MemorySink::default();
    sink.write(&numeric("1", 3)).await.expect("infallible");
    sink.flush().await.expect("infallible");

    assert_eq!(sink.flushes(), 1);
    assert_eq!(sink.messages()[0].id(), MessageId::new(3));
}
