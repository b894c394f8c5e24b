use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pbap_core::app_params::{AppParam, ApplicationParameters};
use pbap_core::types::{
    BdAddr, ListOrder, ObexHandle, PropertyMask, Repositories, VCardFormat,
};
use pbap_protocol::listing::{ListingAssembler, parse_listing};
use pbap_protocol::session::{
    ClientEvent, FileCallout, GetFileRequest, ListDirRequest, ObexEvent, ObexEventKind,
    ObexPacket, ObexParams, Output, SdpResult, ServiceChannel, ServiceRecord, Session,
    SessionConfig, SessionEvent,
};
use pbap_protocol::{ListParams, PbcStatus, PullParams};

const OBEX_OK: u8 = 0xA0;
const OBEX_CONTINUE: u8 = 0x90;

fn make_vcard_listing(entries: usize) -> Vec<u8> {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<vCard-listing version=\"1.0\">\n");
    for i in 0..entries {
        xml.push_str(&format!(
            "  <card handle=\"{i}.vcf\" name=\"Contact &amp; Number {i}\"/>\n"
        ));
    }
    xml.push_str("</vCard-listing>\n");
    xml.into_bytes()
}

fn obex(kind: ObexEventKind, code: u8, packet: Option<ObexPacket>) -> SessionEvent {
    SessionEvent::Obex(ObexEvent {
        handle: ObexHandle(1),
        kind,
        response_code: code,
        params: ObexParams {
            peer_mtu: 1024,
            ..ObexParams::default()
        },
        packet,
    })
}

fn body(data: &[u8], last: bool) -> SessionEvent {
    obex(
        ObexEventKind::GetResponse,
        if last { OBEX_OK } else { OBEX_CONTINUE },
        Some(ObexPacket {
            body: data.to_vec(),
            end_of_body: last,
            length: None,
            app_params: None,
        }),
    )
}

fn connected_session() -> Session {
    let (mut session, _) = Session::enable(SessionConfig::default()).unwrap();
    session
        .handle(SessionEvent::Open {
            peer: BdAddr::new([1, 2, 3, 4, 5, 6]),
            security: 0,
        })
        .unwrap();
    session
        .handle(SessionEvent::Discovery(SdpResult::Found(ServiceRecord {
            version: 0x0101,
            channel: ServiceChannel::Rfcomm(3),
            features: None,
            repositories: Repositories::V1_1,
        })))
        .unwrap();
    session
        .handle(obex(ObexEventKind::ConnectResponse, OBEX_OK, None))
        .unwrap();
    session
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("listing");

    for entries in [10usize, 100, 1000] {
        let xml = make_vcard_listing(entries);
        group.throughput(Throughput::Bytes(xml.len() as u64));

        group.bench_with_input(BenchmarkId::new("parse", entries), &xml, |b, xml| {
            b.iter(|| parse_listing(xml).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("assemble_1k", entries), &xml, |b, xml| {
            b.iter(|| {
                let mut assembler = ListingAssembler::new(1 << 20);
                for chunk in xml.chunks(1000) {
                    assembler.extend(chunk);
                }
                assembler.finish().unwrap()
            });
        });
    }

    group.finish();
}

fn bench_app_params(c: &mut Criterion) {
    let mut group = c.benchmark_group("app_params");

    let params = ApplicationParameters::new()
        .with(AppParam::PropertySelector(PropertyMask::VERSION | PropertyMask::FN))
        .with(AppParam::Format(VCardFormat::V30))
        .with(AppParam::Order(ListOrder::Alphabetical))
        .with(AppParam::SearchValue("Smith".into()))
        .with(AppParam::MaxListCount(100))
        .with(AppParam::ListStartOffset(10));
    let encoded = params.encode().unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| params.encode().unwrap());
    });
    group.bench_function("decode", |b| {
        b.iter(|| ApplicationParameters::decode(&encoded).unwrap());
    });

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let xml = make_vcard_listing(200);
    group.throughput(Throughput::Bytes(xml.len() as u64));
    group.bench_function("list_dir_200", |b| {
        b.iter(|| {
            let mut session = connected_session();
            session
                .handle(SessionEvent::ListDir(ListDirRequest {
                    dir_name: "telecom/pb".into(),
                    params: ListParams::default(),
                }))
                .unwrap();
            let chunks: Vec<&[u8]> = xml.chunks(1000).collect();
            let mut outputs = Vec::new();
            for (i, chunk) in chunks.iter().enumerate() {
                outputs = session.handle(body(chunk, i + 1 == chunks.len())).unwrap();
            }
            assert!(outputs.iter().any(|o| matches!(
                o,
                Output::Notify(ClientEvent::ListComplete {
                    status: PbcStatus::Ok,
                    ..
                })
            )));
        });
    });

    let vcard = vec![b'x'; 64 * 1024];
    group.throughput(Throughput::Bytes(vcard.len() as u64));
    group.bench_function("get_file_64k", |b| {
        b.iter(|| {
            let mut session = connected_session();
            session
                .handle(SessionEvent::GetFile(GetFileRequest {
                    remote_name: "telecom/pb.vcf".into(),
                    local_name: "pb.vcf".into(),
                    params: PullParams::default(),
                }))
                .unwrap();
            let fd = pbap_protocol::FileHandle(1);
            session
                .handle(SessionEvent::FileOpened {
                    status: PbcStatus::Ok,
                    fd: Some(fd),
                })
                .unwrap();
            let chunks: Vec<&[u8]> = vcard.chunks(1000).collect();
            for (i, chunk) in chunks.iter().enumerate() {
                session.handle(body(chunk, i + 1 == chunks.len())).unwrap();
                let outputs = session
                    .handle(SessionEvent::FileWritten {
                        status: PbcStatus::Ok,
                        fd,
                    })
                    .unwrap();
                if i + 1 == chunks.len() {
                    assert!(outputs.contains(&Output::File(FileCallout::Close {
                        fd,
                        remove: false
                    })));
                }
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_app_params, bench_session);
criterion_main!(benches);
