#![allow(dead_code)]

/// Builds ClientHello handshake messages, TLS records and captured frames byte by byte.
#[derive(Debug, Clone)]
pub struct ClientHelloBuilder {
    version: u16,
    session_id: Vec<u8>,
    ciphers: Vec<u16>,
    compression: Vec<u8>,
    extensions: Option<Vec<(u16, Vec<u8>)>>,
}

impl ClientHelloBuilder {
    pub fn new(version: u16) -> Self {
        Self {
            version,
            session_id: Vec::new(),
            ciphers: Vec::new(),
            compression: vec![0x00],
            extensions: None,
        }
    }

    pub fn session_id(mut self, session_id: &[u8]) -> Self {
        self.session_id = session_id.to_vec();
        self
    }

    pub fn ciphers(mut self, ciphers: &[u16]) -> Self {
        self.ciphers = ciphers.to_vec();
        self
    }

    /// Present but empty extensions block
    pub fn empty_extensions(mut self) -> Self {
        self.extensions = Some(Vec::new());
        self
    }

    pub fn extension(mut self, ext_type: u16, data: &[u8]) -> Self {
        self.extensions
            .get_or_insert_with(Vec::new)
            .push((ext_type, data.to_vec()));
        self
    }

    pub fn sni(self, host: &str) -> Self {
        let host = host.as_bytes();
        let mut entry = vec![0x00];
        entry.extend_from_slice(&(host.len() as u16).to_be_bytes());
        entry.extend_from_slice(host);
        let data = prefixed16(&entry);
        self.extension(0x0000, &data)
    }

    pub fn curves(self, curves: &[u16]) -> Self {
        let packed: Vec<u8> = curves.iter().flat_map(|c| c.to_be_bytes()).collect();
        let data = prefixed16(&packed);
        self.extension(0x000a, &data)
    }

    pub fn point_formats(self, formats: &[u8]) -> Self {
        let mut data = vec![formats.len() as u8];
        data.extend_from_slice(formats);
        self.extension(0x000b, &data)
    }

    /// ClientHello body (everything after the 4-byte handshake header)
    pub fn body(&self) -> Vec<u8> {
        let mut body = self.version.to_be_bytes().to_vec();
        body.extend_from_slice(&[0x42; 32]);
        body.push(self.session_id.len() as u8);
        body.extend_from_slice(&self.session_id);
        let packed: Vec<u8> = self.ciphers.iter().flat_map(|c| c.to_be_bytes()).collect();
        body.extend_from_slice(&prefixed16(&packed));
        body.push(self.compression.len() as u8);
        body.extend_from_slice(&self.compression);
        if let Some(extensions) = &self.extensions {
            let mut block = Vec::new();
            for (ext_type, data) in extensions {
                block.extend_from_slice(&ext_type.to_be_bytes());
                block.extend_from_slice(&prefixed16(data));
            }
            body.extend_from_slice(&prefixed16(&block));
        }
        body
    }

    /// Handshake message: type 1, 24-bit length, body
    pub fn handshake(&self) -> Vec<u8> {
        wrap_handshake(0x01, &self.body())
    }

    /// Handshake record carrying the ClientHello
    pub fn record(&self) -> Vec<u8> {
        tls_record(0x16, &self.handshake())
    }
}

pub fn prefixed16(data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(data);
    out
}

pub fn wrap_handshake(handshake_type: u8, body: &[u8]) -> Vec<u8> {
    let len = (body.len() as u32).to_be_bytes();
    let mut out = vec![handshake_type, len[1], len[2], len[3]];
    out.extend_from_slice(body);
    out
}

pub fn tls_record(content_type: u8, fragment: &[u8]) -> Vec<u8> {
    let mut out = vec![content_type, 0x03, 0x01];
    out.extend_from_slice(&prefixed16(fragment));
    out
}

/// The handshake behind `771,4865-4866-4867,0-23-65281,,` with SNI example.com
pub fn tls13_style_hello() -> ClientHelloBuilder {
    ClientHelloBuilder::new(0x0303)
        .session_id(&[0x11; 32])
        .ciphers(&[0x1301, 0x1302, 0x1303])
        .sni("example.com")
        .extension(0x0017, &[])
        .extension(0xff01, &[0x00])
}

pub const TLS13_STYLE_JA3: &str = "771,4865-4866-4867,0-23-65281,,";
pub const TLS13_STYLE_DIGEST: &str = "0af334ef2c866dbf60311c758bd7cfe6";

/// Ethernet + IPv4 + TCP frame around `payload`
pub fn ipv4_tcp_frame(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = vec![0u8; 54];

    // Ethernet header
    frame[12] = 0x08;
    frame[13] = 0x00;

    // IPv4 header (offset 14)
    frame[14] = 0x45;
    let total_len = (20 + 20 + payload.len()) as u16;
    frame[16..18].copy_from_slice(&total_len.to_be_bytes());
    frame[22] = 64;
    frame[23] = 0x06;
    frame[26..30].copy_from_slice(&src_ip);
    frame[30..34].copy_from_slice(&dst_ip);

    // TCP header (offset 34)
    frame[34..36].copy_from_slice(&src_port.to_be_bytes());
    frame[36..38].copy_from_slice(&dst_port.to_be_bytes());
    frame[46] = 0x50;
    frame[47] = 0x18;

    frame.extend_from_slice(payload);
    frame
}

/// Ethernet + IPv6 + TCP frame around `payload`
pub fn ipv6_tcp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 14 + 40 + 20];
    frame[12] = 0x86;
    frame[13] = 0xdd;

    // IPv6 header (offset 14)
    frame[14] = 0x60;
    let payload_len = (20 + payload.len()) as u16;
    frame[18..20].copy_from_slice(&payload_len.to_be_bytes());
    frame[20] = 0x06;
    frame[21] = 64;
    // 2001:db8::1 -> 2001:db8::2
    frame[22..24].copy_from_slice(&[0x20, 0x01]);
    frame[24..26].copy_from_slice(&[0x0d, 0xb8]);
    frame[37] = 0x01;
    frame[38..40].copy_from_slice(&[0x20, 0x01]);
    frame[40..42].copy_from_slice(&[0x0d, 0xb8]);
    frame[53] = 0x02;

    // TCP header (offset 54)
    frame[54..56].copy_from_slice(&src_port.to_be_bytes());
    frame[56..58].copy_from_slice(&dst_port.to_be_bytes());
    frame[66] = 0x50;
    frame[67] = 0x18;

    frame.extend_from_slice(payload);
    frame
}
