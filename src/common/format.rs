use std::fmt::{Display, Error, Formatter};

// Barcode format
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub enum BarcodeFormat {
    Aztec,
    Codabar,
    Code39,
    Code93,
    Code128,
    DataMatrix,
    Ean8,
    Ean13,
    Itf,
    MaxiCode,
    Pdf417,
    QrCode,
    Rss14,
    RssExpanded,
    UpcA,
    UpcE,
    UpcEanExtension,
    Msi,
    Plessey,
    Imb,
    PharmaCode,
}

impl BarcodeFormat {
    pub const ALL: [BarcodeFormat; 21] = [
        Self::Aztec,
        Self::Codabar,
        Self::Code39,
        Self::Code93,
        Self::Code128,
        Self::DataMatrix,
        Self::Ean8,
        Self::Ean13,
        Self::Itf,
        Self::MaxiCode,
        Self::Pdf417,
        Self::QrCode,
        Self::Rss14,
        Self::RssExpanded,
        Self::UpcA,
        Self::UpcE,
        Self::UpcEanExtension,
        Self::Msi,
        Self::Plessey,
        Self::Imb,
        Self::PharmaCode,
    ];

    /// Linear formats are read along scan lines, 2D formats need a located grid.
    pub fn is_linear(self) -> bool {
        matches!(
            self,
            Self::Codabar
                | Self::Code39
                | Self::Code93
                | Self::Code128
                | Self::Ean8
                | Self::Ean13
                | Self::Itf
                | Self::Rss14
                | Self::RssExpanded
                | Self::UpcA
                | Self::UpcE
                | Self::UpcEanExtension
                | Self::Msi
                | Self::Plessey
                | Self::PharmaCode
        )
    }
}

impl Display for BarcodeFormat {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let name = match *self {
            Self::Aztec => "AZTEC",
            Self::Codabar => "CODABAR",
            Self::Code39 => "CODE_39",
            Self::Code93 => "CODE_93",
            Self::Code128 => "CODE_128",
            Self::DataMatrix => "DATA_MATRIX",
            Self::Ean8 => "EAN_8",
            Self::Ean13 => "EAN_13",
            Self::Itf => "ITF",
            Self::MaxiCode => "MAXICODE",
            Self::Pdf417 => "PDF_417",
            Self::QrCode => "QR_CODE",
            Self::Rss14 => "RSS_14",
            Self::RssExpanded => "RSS_EXPANDED",
            Self::UpcA => "UPC_A",
            Self::UpcE => "UPC_E",
            Self::UpcEanExtension => "UPC_EAN_EXTENSION",
            Self::Msi => "MSI",
            Self::Plessey => "PLESSEY",
            Self::Imb => "IMB",
            Self::PharmaCode => "PHARMA_CODE",
        };
        f.write_str(name)
    }
}
